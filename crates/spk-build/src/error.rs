// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Denotes a failure of the build pipeline itself: a nonzero build script
/// exit, an empty changeset, or a forbidden filesystem change.
#[derive(Debug, Error, Diagnostic)]
#[error("Build error: {message}")]
pub struct BuildError {
    pub message: String,
}

impl BuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
#[diagnostic(url(
    "https://spkenv.dev/error_codes#{}",
    self.code().unwrap_or_else(|| Box::new("spk::build::generic"))
))]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(code(spk::build::build_error))]
    Build(#[from] BuildError),

    #[error(transparent)]
    #[diagnostic(code(spk::build::solver))]
    SpkSolverError(#[from] spk_solver::Error),

    #[error(transparent)]
    #[diagnostic(code(spk::build::spec))]
    SpkSpecError(#[from] spk_spec::Error),

    #[error(transparent)]
    #[diagnostic(code(spk::build::storage))]
    SpkStorageError(#[from] spk_storage::Error),

    #[error(transparent)]
    #[diagnostic(code(spk::build::solution))]
    SpkSolverSolutionError(#[from] spk_solver_solution::Error),

    #[error(transparent)]
    #[diagnostic(code(spk::build::ident))]
    SpkIdentError(#[from] spk_ident::Error),

    #[error("Error: {0}")]
    #[diagnostic(code(spk::build::generic))]
    String(String),
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::String(err)
    }
}
