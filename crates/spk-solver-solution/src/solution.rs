// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::collections::HashMap;
use std::sync::Arc;

use spk_ident::Request;
use spk_name::{PkgName, PkgNameBuf};
use spk_option_map::OptionMap;
use spk_spec::Spec;
use spk_storage::Repository;
use spk_version::Version;

use crate::{Error, Result};

/// A single resolved entry in a [`Solution`]: the request it satisfies,
/// the spec chosen for it, and the repository it came from.
///
/// `repo` is `None` when the spec was contributed wholesale by another
/// package's embedded build: the SOURCE/EMBEDDED/DIGEST distinction
/// itself already lives on `spec.pkg.build`, so no separate enum is
/// needed to track it here.
#[derive(Clone)]
pub struct SolvedRequest {
    pub request: Request,
    pub spec: Spec,
    pub repo: Option<Arc<dyn Repository>>,
}

impl SolvedRequest {
    pub fn is_source_build(&self) -> bool {
        self.spec.pkg.is_source()
    }
}

/// An ordered mapping from package name to its resolved request, spec
/// and repository.
///
/// Insertion order is preserved for display and environment rendering,
/// matching the order requests were satisfied during the search.
#[derive(Clone, Default)]
pub struct Solution {
    options: OptionMap,
    resolved: HashMap<PkgNameBuf, SolvedRequest>,
    order: Vec<PkgNameBuf>,
}

impl Solution {
    pub fn new(options: OptionMap) -> Self {
        Self {
            options,
            resolved: HashMap::default(),
            order: Vec::default(),
        }
    }

    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Add (or replace) the resolution for `request`'s package name.
    pub fn add(&mut self, request: Request, spec: Spec, repo: Option<Arc<dyn Repository>>) {
        let name = request.name().to_owned();
        if !self.resolved.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.resolved
            .insert(name, SolvedRequest { request, spec, repo });
    }

    pub fn get(&self, name: &PkgName) -> Option<&SolvedRequest> {
        self.resolved.get(name)
    }

    /// The resolved entries, in the order they were added.
    pub fn items(&self) -> Vec<&SolvedRequest> {
        self.order
            .iter()
            .filter_map(|name| self.resolved.get(name))
            .collect()
    }

    /// The distinct set of repositories this solution drew packages from.
    pub fn repositories(&self) -> Vec<Arc<dyn Repository>> {
        let mut seen: Vec<&str> = Vec::new();
        let mut repos = Vec::new();
        for entry in self.resolved.values() {
            if let Some(repo) = &entry.repo {
                let name = repo.name().as_str();
                if seen.contains(&name) {
                    continue;
                }
                seen.push(name);
                repos.push(repo.clone());
            }
        }
        repos
    }

    /// A version lookup callback suitable for [`spk_spec::Spec::render_all_pins`],
    /// resolving a dependency name to the version this solution chose for it.
    pub fn resolved_version(&self, name: &PkgName) -> Option<Version> {
        self.resolved.get(name).map(|e| e.spec.pkg.version.clone())
    }

    /// Render every install requirement's pin templates across every spec
    /// already in the solution against this solution's own resolutions.
    ///
    /// Existing entries are rewritten in place; this is used by the
    /// builder after resolving the build environment so that pins like
    /// `x.x` referring to a sibling dependency render before the build
    /// script sees the requirement.
    pub fn render_all_pins(&mut self) -> Result<()> {
        let snapshot = self.clone();
        for name in self.order.clone() {
            if let Some(entry) = self.resolved.get_mut(&name) {
                entry
                    .spec
                    .render_all_pins(|n| snapshot.resolved_version(n))?;
            }
        }
        Ok(())
    }

    /// This solution's data rendered as `SPK_OPT_<name>=<value>` environment
    /// variable assignments.
    pub fn to_environment(&self) -> HashMap<String, String> {
        self.options.to_environment()
    }
}

#[cfg(test)]
mod solution_test {
    use spk_ident::parse_ident;
    use spk_storage::MemRepository;

    use super::*;

    fn entry(ident: &str) -> (Request, Spec) {
        let ident = parse_ident(ident).unwrap();
        let request = Request::new(ident.name.clone());
        (request, Spec::new(ident))
    }

    #[test]
    fn test_add_and_get_preserves_insertion_order() {
        let mut solution = Solution::default();
        let (req_a, spec_a) = entry("a/1.0.0");
        let (req_b, spec_b) = entry("b/1.0.0");
        solution.add(req_a, spec_a, None);
        solution.add(req_b, spec_b, None);
        let names: Vec<_> = solution
            .items()
            .into_iter()
            .map(|e| e.request.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_get_by_name() {
        let mut solution = Solution::default();
        let (req, spec) = entry("a/1.0.0");
        solution.add(req, spec, None);
        assert!(solution
            .get("a".parse::<PkgNameBuf>().unwrap().as_ref())
            .is_some());
        assert!(solution
            .get("missing".parse::<PkgNameBuf>().unwrap().as_ref())
            .is_none());
    }

    #[test]
    fn test_repositories_deduplicated() {
        let repo: Arc<dyn Repository> = Arc::new(MemRepository::default());
        let mut solution = Solution::default();
        let (req_a, spec_a) = entry("a/1.0.0");
        let (req_b, spec_b) = entry("b/1.0.0");
        solution.add(req_a, spec_a, Some(repo.clone()));
        solution.add(req_b, spec_b, Some(repo.clone()));
        assert_eq!(solution.repositories().len(), 1);
    }

    #[test]
    fn test_to_environment_uses_spk_opt_prefix() {
        let mut options = OptionMap::default();
        options.insert("debug".parse().unwrap(), "on".into());
        let solution = Solution::new(options);
        let env = solution.to_environment();
        assert_eq!(env.get("SPK_OPT_debug"), Some(&"on".to_string()));
    }
}
