// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;

use spk_ident::Request;
use spk_option_map::OptionMap;
use spk_solver_graph::{Graph, NodeId};
use spk_solver_solution::Solution;
use spk_storage::Repository;

use crate::error::UnresolvedPackageError;
use crate::{Error, Result};

fn add_initial_request(graph: &mut Graph, root: NodeId, request: Request) -> Result<()> {
    graph.add_request(root, request).map_err(|err| match err {
        spk_solver_graph::Error::SpkIdentError(spk_ident::Error::ConflictingRequestsError {
            name,
            reason,
        }) => Error::ConflictingRequestsError(format!("{name}: {reason}")),
        other => Error::SpkSolverGraphError(other),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Complete,
}

/// Drives the decision tree to a [`Solution`] via depth-first backtracking
/// search.
///
/// A `Solver` is single-use: [`Solver::solve`] transitions it
/// `Idle -> Running -> Complete` and refuses to be re-entered once
/// complete. It performs no concurrent branch exploration and touches no
/// shared state beyond the [`Repository`] trait objects it was given.
pub struct Solver {
    options: OptionMap,
    repos: Vec<Arc<dyn Repository>>,
    initial_requests: Vec<Request>,
    state: State,
}

impl Solver {
    pub fn new(options: OptionMap) -> Self {
        Self {
            options,
            repos: Vec::new(),
            initial_requests: Vec::new(),
            state: State::Idle,
        }
    }

    /// Add a repository to consult, in the order it should be preferred
    /// by every [`spk_solver_package_iterator::PackageIterator`] this
    /// solve constructs.
    pub fn add_repository(&mut self, repo: Arc<dyn Repository>) {
        self.repos.push(repo);
    }

    /// Queue `request` to be satisfied by the solve. Requests queued
    /// here form the root node's initial request set; requests
    /// contributed by resolved specs are added internally as the search
    /// proceeds.
    pub fn add_request(&mut self, request: Request) {
        self.initial_requests.push(request);
    }

    /// Run the backtracking search to completion, returning the
    /// resulting [`Solution`] or the deepest terminal error recorded
    /// along the decision tree once every branch has been exhausted.
    ///
    /// May only be called once per `Solver`; a second call returns
    /// [`Error::AlreadyComplete`].
    pub fn solve(&mut self) -> Result<Solution> {
        if self.state == State::Complete {
            return Err(Error::AlreadyComplete);
        }
        self.state = State::Running;

        let mut graph = Graph::new();
        let root = graph.root();
        let initial_requests = std::mem::take(&mut self.initial_requests);
        for request in initial_requests {
            add_initial_request(&mut graph, root, request)?;
        }

        let mut node = root;
        loop {
            let Some(request) = graph.next_request(node) else {
                break;
            };
            if request.pin.is_some() {
                tracing::debug!(
                    pkg = %request.pkg,
                    "request has an unresolved pin; proceeding without rendering it"
                );
            }
            tracing::trace!(pkg = %request.pkg, "resolving request");
            match self.solve_request(&mut graph, node, &request) {
                Ok(child) => {
                    tracing::debug!(pkg = %request.pkg, "resolved");
                    node = child;
                }
                Err(err) => match graph.parent(node) {
                    Some(parent) => {
                        tracing::debug!(pkg = %request.pkg, "backtracking: {err}");
                        node = parent;
                    }
                    None => {
                        tracing::warn!("no candidate satisfies the root request set");
                        let chain = graph.get_error_chain(node);
                        return Err(chain
                            .into_iter()
                            .last()
                            .map(Error::String)
                            .unwrap_or(err));
                    }
                },
            }
        }

        self.state = State::Complete;
        Ok(graph.get_current_solution(node))
    }

    /// Attempt to satisfy `request` by branching off of `state`.
    ///
    /// The iterator consulted here is attached to `state`, not to the
    /// freshly created branch: backtracking re-enters `state` without
    /// resetting it, so a second attempt at the same request naturally
    /// advances to the next candidate instead of repeating the first.
    fn solve_request(&self, graph: &mut Graph, state: NodeId, request: &Request) -> Result<NodeId> {
        let child = graph.add_branch(state);
        match graph.advance_iterator(state, request, &self.repos, &self.options) {
            Ok(Some((spec, repo))) => {
                graph
                    .set_resolved(child, request.clone(), spec, Some(repo))
                    .map_err(|err| match err {
                        spk_solver_graph::Error::SpkIdentError(
                            spk_ident::Error::ConflictingRequestsError { name, reason },
                        ) => Error::ConflictingRequestsError(format!("{name}: {reason}")),
                        other => Error::SpkSolverGraphError(other),
                    })?;
                Ok(child)
            }
            Ok(None) => {
                let history = graph.iterator_history(state, request.name());
                let err = UnresolvedPackageError {
                    request: request.clone(),
                    history,
                };
                let message = err.to_string();
                graph.set_error(child, message);
                Err(Error::UnresolvedPackageError(err))
            }
            Err(iter_err) => {
                let err: Error = Error::SpkSolverPackageIteratorError(iter_err);
                graph.set_error(child, err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod solver_test {
    use spk_ident::{parse_ident, Request};
    use spk_ident_build::Build;
    use spk_spec::Spec;
    use spk_storage::{LayerDigest, MemRepository};

    use super::*;

    fn pkg_request(s: &str) -> Request {
        Request {
            pkg: s.parse::<spk_ident::RangeIdent>().unwrap(),
            prerelease_policy: Default::default(),
            inclusion_policy: Default::default(),
            pin: None,
        }
    }

    fn publish(repo: &MemRepository, ident: &str, requires: &[&str]) {
        let ident = parse_ident(ident).unwrap();
        let mut spec = Spec::new(ident.with_build(Some(Build::digest_from_options(
            &OptionMap::default(),
        ))));
        for req in requires {
            spec.install.requirements.push(pkg_request(req));
        }
        repo.publish_package(spec, LayerDigest::new("layer")).unwrap();
    }

    #[test]
    fn test_simple_chain() {
        let repo = Arc::new(MemRepository::default());
        publish(&repo, "a/1.0.0", &["b/>=1"]);
        publish(&repo, "b/1.2.0", &[]);

        let mut solver = Solver::new(OptionMap::default());
        solver.add_repository(repo);
        solver.add_request(Request::new("a".parse().unwrap()));
        let solution = solver.solve().unwrap();

        assert_eq!(solution.len(), 2);
        assert!(solution
            .get("a".parse::<spk_name::PkgNameBuf>().unwrap().as_ref())
            .is_some());
        assert_eq!(
            solution
                .get("b".parse::<spk_name::PkgNameBuf>().unwrap().as_ref())
                .unwrap()
                .spec
                .pkg
                .version,
            "1.2.0".parse().unwrap()
        );
    }

    #[test]
    fn test_backtracks_on_unsatisfiable_dependency() {
        let repo = Arc::new(MemRepository::default());
        publish(&repo, "a/2.0.0", &["b/<1"]);
        publish(&repo, "a/1.0.0", &["b/>=1"]);
        publish(&repo, "b/1.0.0", &[]);

        let mut solver = Solver::new(OptionMap::default());
        solver.add_repository(repo);
        solver.add_request(Request::new("a".parse().unwrap()));
        let solution = solver.solve().unwrap();

        assert_eq!(
            solution
                .get("a".parse::<spk_name::PkgNameBuf>().unwrap().as_ref())
                .unwrap()
                .spec
                .pkg
                .version,
            "1.0.0".parse().unwrap()
        );
    }

    #[test]
    fn test_empty_repo_list_is_unresolved() {
        let mut solver = Solver::new(OptionMap::default());
        solver.add_request(Request::new("a".parse().unwrap()));
        let err = solver.solve().unwrap_err();
        assert!(matches!(err, Error::UnresolvedPackageError(_)));
    }

    #[test]
    fn test_unresolvable_transitive_dependency_surfaces_deepest_error() {
        // only candidate for "a" requires "b", but no "b" exists anywhere.
        // The top-level failure re-enters the root with no error of its
        // own recorded there; the useful diagnostic lives on the
        // abandoned node where "b" itself was exhausted, which is what
        // must be surfaced instead of a generic "a" failure.
        let repo = Arc::new(MemRepository::default());
        publish(&repo, "a/1.0.0", &["b/>=1"]);

        let mut solver = Solver::new(OptionMap::default());
        solver.add_repository(repo);
        solver.add_request(Request::new("a".parse().unwrap()));
        let err = solver.solve().unwrap_err();
        match err {
            Error::String(message) => {
                assert!(
                    message.contains('b'),
                    "expected the deepest error to mention 'b', got: {message}"
                );
            }
            other => panic!("expected a surfaced deepest-error String, got: {other}"),
        }
    }

    #[test]
    fn test_conflicting_initial_requests() {
        let repo = Arc::new(MemRepository::default());
        publish(&repo, "b/1.0.0", &[]);
        let mut solver = Solver::new(OptionMap::default());
        solver.add_repository(repo);
        solver.add_request(pkg_request("b/>=2"));
        solver.add_request(pkg_request("b/<2"));
        let err = solver.solve().unwrap_err();
        assert!(matches!(err, Error::ConflictingRequestsError(_)));
    }

    #[test]
    fn test_prerelease_excluded_by_default() {
        let repo = Arc::new(MemRepository::default());
        let ident = parse_ident("x/1.0.0-beta").unwrap();
        let spec = Spec::new(
            ident.with_build(Some(Build::digest_from_options(&OptionMap::default()))),
        );
        repo.publish_package(spec, LayerDigest::new("layer")).unwrap();

        let mut solver = Solver::new(OptionMap::default());
        solver.add_repository(repo);
        solver.add_request(Request::new("x".parse().unwrap()));
        let err = solver.solve().unwrap_err();
        assert!(matches!(err, Error::UnresolvedPackageError(_)));
    }

    #[test]
    fn test_source_build_does_not_append_requirements() {
        let repo = Arc::new(MemRepository::default());
        let ident = parse_ident("a/1.0.0").unwrap().into_build(Build::Source);
        let mut spec = Spec::new(ident);
        spec.install
            .requirements
            .push(Request::new("missing".parse().unwrap()));
        repo.publish_package(spec, LayerDigest::new("layer")).unwrap();

        let mut solver = Solver::new(OptionMap::default());
        solver.add_repository(repo);
        let mut req = Request::new("a".parse().unwrap());
        req.pkg.build = Some(Build::Source);
        solver.add_request(req);
        let solution = solver.solve().unwrap();
        assert_eq!(solution.len(), 1);
    }

    #[test]
    fn test_re_solving_a_complete_solver_errors() {
        let mut solver = Solver::new(OptionMap::default());
        solver.solve().unwrap();
        assert!(matches!(solver.solve(), Err(Error::AlreadyComplete)));
    }
}
