// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::fmt;

use miette::Diagnostic;
use spk_ident::Request;
use spk_solver_package_iterator::HistoryEntry;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// No candidate in any configured repository satisfied a request.
///
/// Carries the package iterator's full skip history so the caller can
/// explain, after the fact, why every version/build it considered was
/// rejected -- this is the data [`spk_solver_graph::Graph::get_error_chain`]
/// preserves for diagnostic reconstruction once a solve has failed.
#[derive(Debug)]
pub struct UnresolvedPackageError {
    pub request: Request,
    pub history: Vec<HistoryEntry>,
}

impl fmt::Display for UnresolvedPackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "no candidate satisfied the request for '{}'", self.request.pkg)?;
        for entry in &self.history {
            writeln!(f, "  - rejected {}: {}", entry.ident, entry.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for UnresolvedPackageError {}

#[derive(Debug, Error, Diagnostic)]
#[diagnostic(url(
    "https://spkenv.dev/error_codes#{}",
    self.code().unwrap_or_else(|| Box::new("spk::solver::generic"))
))]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(code(spk::solver::unresolved_package))]
    UnresolvedPackageError(#[from] UnresolvedPackageError),

    #[error("conflicting requests: {0}")]
    #[diagnostic(code(spk::solver::conflicting_requests))]
    ConflictingRequestsError(String),

    #[error("a Solver instance may only be solved once; this one has already completed")]
    #[diagnostic(code(spk::solver::already_complete))]
    AlreadyComplete,

    #[error(transparent)]
    #[diagnostic(code(spk::solver::graph))]
    SpkSolverGraphError(#[from] spk_solver_graph::Error),

    #[error(transparent)]
    #[diagnostic(code(spk::solver::package_iterator))]
    SpkSolverPackageIteratorError(#[from] spk_solver_package_iterator::Error),

    #[error(transparent)]
    #[diagnostic(code(spk::solver::solution))]
    SpkSolverSolutionError(#[from] spk_solver_solution::Error),

    #[error(transparent)]
    #[diagnostic(code(spk::solver::ident))]
    SpkIdentError(#[from] spk_ident::Error),

    #[error("Error: {0}")]
    #[diagnostic(code(spk::solver::generic))]
    String(String),
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::String(err)
    }
}
