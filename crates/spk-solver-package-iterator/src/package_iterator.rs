// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::collections::VecDeque;
use std::sync::Arc;

use spk_ident::{Ident, Request};
use spk_ident_build::Build;
use spk_option_map::OptionMap;
use spk_spec::Spec;
use spk_storage::Repository;
use spk_version::{Compatibility, Version};

use crate::Result;

/// A candidate skipped by a [`PackageIterator`], with the reason it was
/// rejected, kept so an exhausted iterator can explain itself.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub ident: Ident,
    pub reason: String,
}

/// Enumerates candidate `(Spec, Repository)` pairs for one [`Request`],
/// newest-first within each repository, consulted in repository order.
///
/// Each call to [`PackageIterator::next`] may perform repository I/O;
/// candidates that fail the request's compatibility check are recorded
/// in [`PackageIterator::history`] rather than returned.
pub struct PackageIterator {
    request: Request,
    options: OptionMap,
    repos: Vec<Arc<dyn Repository>>,
    repo_idx: usize,
    repo_started: bool,
    versions: VecDeque<Version>,
    current_version: Option<Version>,
    builds: VecDeque<Build>,
    history: Vec<HistoryEntry>,
}

impl PackageIterator {
    pub fn new(request: Request, repos: Vec<Arc<dyn Repository>>, options: OptionMap) -> Self {
        Self {
            request,
            options,
            repos,
            repo_idx: 0,
            repo_started: false,
            versions: VecDeque::new(),
            current_version: None,
            builds: VecDeque::new(),
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn current_repo(&self) -> Option<Arc<dyn Repository>> {
        self.repos.get(self.repo_idx).cloned()
    }

    /// Populate `self.versions` for the repository at `repo_idx`, newest
    /// first, filtered to the request's version range and pre-release
    /// policy.
    fn fill_versions(&mut self) -> Result<()> {
        let Some(repo) = self.current_repo() else {
            return Ok(());
        };
        let name = self.request.name();
        let mut versions: Vec<Version> = repo
            .list_versions(name)?
            .into_iter()
            .filter(|v| {
                v.pre.is_empty()
                    || matches!(
                        self.request.prerelease_policy,
                        spk_ident::PreReleasePolicy::IncludeAll
                    )
            })
            .filter(|v| self.request.pkg.is_version_applicable(v).is_ok())
            .collect();
        versions.sort();
        versions.reverse();
        self.versions = versions.into();
        Ok(())
    }

    /// Populate `self.builds` for `version` in the current repository,
    /// ordered embedded, then digest, then source.
    fn fill_builds(&mut self, version: &Version) -> Result<()> {
        let Some(repo) = self.current_repo() else {
            return Ok(());
        };
        let mut idents = repo.list_builds(self.request.name(), version)?;
        idents.sort_by_key(build_rank);
        self.builds = idents
            .into_iter()
            .filter_map(|ident| ident.build)
            .collect();
        Ok(())
    }

    /// Check whether `spec`'s `build` satisfies this iterator's request,
    /// given the option assignment in scope.
    fn compatibility(&self, spec: &Spec, build: &Build) -> Compatibility {
        let version_compat = self.request.pkg.is_version_applicable(&spec.pkg.version);
        if !version_compat.is_ok() {
            return version_compat;
        }
        let build_compat = self.request.pkg.is_build_applicable(build);
        if !build_compat.is_ok() {
            return build_compat;
        }
        if let Build::Digest(_) = build {
            let resolved = match spec.resolve_all_options(&self.options) {
                Ok(r) => r,
                Err(err) => return Compatibility::incompatible(err.to_string()),
            };
            let digest = Build::digest_from_options(&resolved);
            if &digest != build {
                return Compatibility::incompatible(format!(
                    "build {build} was produced with different option values than requested"
                ));
            }
        }
        Compatibility::Compatible
    }

    /// Advance to the next acceptable candidate, consulting repositories
    /// and versions in preference order, recording every rejection.
    pub fn next(&mut self) -> Result<Option<(Spec, Arc<dyn Repository>)>> {
        loop {
            if let Some(build) = self.builds.pop_front() {
                let repo = match self.current_repo() {
                    Some(r) => r,
                    None => return Ok(None),
                };
                let version = self
                    .current_version
                    .clone()
                    .expect("a version is active whenever builds are populated");
                let ident = Ident {
                    name: self.request.name().to_owned(),
                    version,
                    build: Some(build),
                };
                let spec = match repo.read_spec(&ident) {
                    Ok(spec) => spec,
                    Err(err) => {
                        self.history.push(HistoryEntry {
                            ident,
                            reason: err.to_string(),
                        });
                        continue;
                    }
                };
                let build = ident.build.clone().expect("constructed with a build above");
                let compat = self.compatibility(&spec, &build);
                if compat.is_ok() {
                    return Ok(Some((spec, repo)));
                }
                self.history.push(HistoryEntry {
                    ident,
                    reason: compat.to_string(),
                });
                continue;
            }

            if let Some(version) = self.versions.pop_front() {
                self.current_version = Some(version.clone());
                self.fill_builds(&version)?;
                continue;
            }

            if !self.repo_started {
                self.repo_started = true;
                self.fill_versions()?;
                continue;
            }

            self.repo_idx += 1;
            self.repo_started = false;
            if self.current_repo().is_none() {
                return Ok(None);
            }
        }
    }
}

fn build_rank(ident: &Ident) -> u8 {
    match &ident.build {
        Some(Build::Embedded) => 0,
        Some(Build::Digest(_)) => 1,
        Some(Build::Source) => 2,
        None => 3,
    }
}

#[cfg(test)]
mod package_iterator_test {
    use spk_storage::{LayerDigest, MemRepository};

    use super::*;

    fn publish_build(repo: &MemRepository, name: &str, version: &str) {
        let digest = Build::digest_from_options(&OptionMap::default());
        let ident = Ident {
            name: name.parse().unwrap(),
            version: version.parse().unwrap(),
            build: Some(digest),
        };
        repo.publish_package(Spec::new(ident), LayerDigest::new("layer"))
            .unwrap();
    }

    #[test]
    fn test_descending_version_order() {
        let mem = MemRepository::default();
        publish_build(&mem, "a", "1.0.0");
        publish_build(&mem, "a", "2.0.0");
        let repo: Arc<dyn Repository> = Arc::new(mem);
        let request = Request::new("a".parse().unwrap());
        let mut iter = PackageIterator::new(request, vec![repo], OptionMap::default());
        let (first, _) = iter.next().unwrap().unwrap();
        assert_eq!(first.pkg.version, "2.0.0".parse().unwrap());
        let (second, _) = iter.next().unwrap().unwrap();
        assert_eq!(second.pkg.version, "1.0.0".parse().unwrap());
        assert!(iter.next().unwrap().is_none());
    }

    #[test]
    fn test_exhausted_iterator_records_history() {
        let mem = MemRepository::default();
        publish_build(&mem, "a", "1.0.0");
        let repo: Arc<dyn Repository> = Arc::new(mem);
        let mut request = Request::new("a".parse().unwrap());
        request.pkg.build = Some("SRC-----".parse().unwrap());
        let mut iter = PackageIterator::new(request, vec![repo], OptionMap::default());
        assert!(iter.next().unwrap().is_none());
        assert_eq!(iter.history().len(), 1);
    }
}
