// Copyright (c) 2022 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::collections::HashMap;
use std::sync::RwLock;

use spk_ident::Ident;
use spk_ident_build::Build;
use spk_name::{PkgName, PkgNameBuf, RepositoryName, RepositoryNameBuf};
use spk_spec::Spec;
use spk_version::Version;

use crate::{Error, Result};

/// Opaque content hash of a built package's installed files.
///
/// The core never interprets the bytes behind a layer; it only stores and
/// compares the digest a builder produced against what a repository has on
/// record, so publishing and lookups stay agnostic to whatever packs the
/// actual file tree (a filesystem layer, an archive, a CAS blob store).
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LayerDigest(String);

impl LayerDigest {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A source of package specs and builds.
///
/// A repository is consulted by the solver for what builds exist and what
/// each build requires, and by the builder to publish new ones. All
/// methods are synchronous: the core never concurrently explores more than
/// one repository query at a time.
pub trait Repository: Send + Sync {
    fn name(&self) -> &RepositoryName;

    /// All versions of `name` known to this repository, in no particular
    /// order. Callers that need a specific order (eg descending) sort the
    /// result themselves.
    fn list_versions(&self, name: &PkgName) -> Result<Vec<Version>>;

    /// All builds of `name` at `version` known to this repository.
    fn list_builds(&self, name: &PkgName, version: &Version) -> Result<Vec<Ident>>;

    /// Read the spec recorded for a specific, fully qualified identifier.
    fn read_spec(&self, ident: &Ident) -> Result<Spec>;

    /// Record `spec` under its own identifier.
    ///
    /// Fails with [`Error::SpecAlreadyExists`] if a spec is already on file
    /// for this identifier and `force` is false.
    fn publish_spec(&self, spec: Spec, force: bool) -> Result<()>;

    /// Record a built package, associating its spec with the content
    /// produced for it.
    ///
    /// Fails with [`Error::PackageAlreadyExists`] if this identifier is
    /// already published. The spec for this identifier must have already
    /// been published via [`Repository::publish_spec`].
    fn publish_package(&self, spec: Spec, layer_digest: LayerDigest) -> Result<()>;

    /// The content digest previously published for a build, if any.
    fn read_layer_digest(&self, ident: &Ident) -> Result<LayerDigest>;
}

#[derive(Default)]
struct VersionEntry {
    spec: Option<Spec>,
    builds: HashMap<Build, (Spec, Option<LayerDigest>)>,
}

/// An in-memory [`Repository`], holding everything published to it for the
/// lifetime of the process.
///
/// This is the only concrete repository the core ships: real backing
/// stores (content-addressed filesystems, remote registries) are
/// collaborators outside it, plugged in wherever a [`Repository`] trait
/// object is accepted.
pub struct MemRepository {
    name: RepositoryNameBuf,
    packages: RwLock<HashMap<PkgNameBuf, HashMap<Version, VersionEntry>>>,
}

impl MemRepository {
    pub fn new(name: RepositoryNameBuf) -> Self {
        Self {
            name,
            packages: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemRepository {
    fn default() -> Self {
        Self::new("mem".parse::<RepositoryNameBuf>().unwrap())
    }
}

impl Repository for MemRepository {
    fn name(&self) -> &RepositoryName {
        &self.name
    }

    fn list_versions(&self, name: &PkgName) -> Result<Vec<Version>> {
        let packages = self.packages.read().unwrap();
        Ok(packages
            .get(name)
            .map(|versions| versions.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn list_builds(&self, name: &PkgName, version: &Version) -> Result<Vec<Ident>> {
        let packages = self.packages.read().unwrap();
        let Some(versions) = packages.get(name) else {
            return Ok(Vec::new());
        };
        let Some(entry) = versions.get(version) else {
            return Ok(Vec::new());
        };
        Ok(entry
            .builds
            .keys()
            .map(|build| Ident {
                name: name.to_owned(),
                version: version.clone(),
                build: Some(build.clone()),
            })
            .collect())
    }

    fn read_spec(&self, ident: &Ident) -> Result<Spec> {
        let packages = self.packages.read().unwrap();
        let versions = packages
            .get(ident.name.as_ref())
            .ok_or_else(|| Error::PackageNotFound(ident.clone()))?;
        let entry = versions
            .get(&ident.version)
            .ok_or_else(|| Error::PackageNotFound(ident.clone()))?;
        match &ident.build {
            None => entry
                .spec
                .clone()
                .ok_or_else(|| Error::PackageNotFound(ident.clone())),
            Some(build) => entry
                .builds
                .get(build)
                .map(|(spec, _)| spec.clone())
                .ok_or_else(|| Error::PackageNotFound(ident.clone())),
        }
    }

    fn publish_spec(&self, spec: Spec, force: bool) -> Result<()> {
        if spec.pkg.build.is_some() {
            return Err(Error::String(format!(
                "publish_spec given a build identifier, expected an unbuilt recipe: {}",
                spec.pkg
            )));
        }
        let mut packages = self.packages.write().unwrap();
        let versions = packages.entry(spec.pkg.name.clone()).or_default();
        let entry = versions.entry(spec.pkg.version.clone()).or_default();
        if entry.spec.is_some() && !force {
            return Err(Error::SpecAlreadyExists(spec.pkg.clone()));
        }
        entry.spec = Some(spec);
        Ok(())
    }

    fn publish_package(&self, spec: Spec, layer_digest: LayerDigest) -> Result<()> {
        let build = spec
            .pkg
            .build
            .clone()
            .ok_or_else(|| Error::String(format!("spec has no build digest: {}", spec.pkg)))?;
        let mut packages = self.packages.write().unwrap();
        let versions = packages.entry(spec.pkg.name.clone()).or_default();
        let entry = versions.entry(spec.pkg.version.clone()).or_default();
        if entry.builds.contains_key(&build) {
            return Err(Error::PackageAlreadyExists(spec.pkg.clone()));
        }
        entry.builds.insert(build, (spec, Some(layer_digest)));
        Ok(())
    }

    fn read_layer_digest(&self, ident: &Ident) -> Result<LayerDigest> {
        let build = ident
            .build
            .as_ref()
            .ok_or_else(|| Error::PackageNotFound(ident.clone()))?;
        let packages = self.packages.read().unwrap();
        let versions = packages
            .get(ident.name.as_ref())
            .ok_or_else(|| Error::PackageNotFound(ident.clone()))?;
        let entry = versions
            .get(&ident.version)
            .ok_or_else(|| Error::PackageNotFound(ident.clone()))?;
        entry
            .builds
            .get(build)
            .and_then(|(_, digest)| digest.clone())
            .ok_or_else(|| Error::PackageNotFound(ident.clone()))
    }
}

#[cfg(test)]
mod storage_test {
    use spk_ident::parse_ident;

    use super::*;

    fn spec(ident: &str) -> Spec {
        Spec::new(parse_ident(ident).unwrap())
    }

    #[test]
    fn test_publish_and_read_spec() {
        let repo = MemRepository::default();
        repo.publish_spec(spec("my-pkg/1.0.0"), false).unwrap();
        let read = repo.read_spec(&parse_ident("my-pkg/1.0.0").unwrap()).unwrap();
        assert_eq!(read.pkg, parse_ident("my-pkg/1.0.0").unwrap());
    }

    #[test]
    fn test_publish_spec_twice_without_force_fails() {
        let repo = MemRepository::default();
        repo.publish_spec(spec("my-pkg/1.0.0"), false).unwrap();
        assert!(repo.publish_spec(spec("my-pkg/1.0.0"), false).is_err());
        assert!(repo.publish_spec(spec("my-pkg/1.0.0"), true).is_ok());
    }

    #[test]
    fn test_publish_and_list_builds() {
        let repo = MemRepository::default();
        let ident = parse_ident("my-pkg/1.0.0/3TCOOP2W").unwrap();
        let mut built = spec("my-pkg/1.0.0");
        built.pkg = ident.clone();
        repo.publish_package(built, LayerDigest::new("abc123"))
            .unwrap();
        let builds = repo
            .list_builds(ident.name.as_ref(), &ident.version)
            .unwrap();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0], ident);
    }

    #[test]
    fn test_list_versions_unknown_package() {
        let repo = MemRepository::default();
        assert!(repo
            .list_versions("does-not-exist".parse::<PkgNameBuf>().unwrap().as_ref())
            .unwrap()
            .is_empty());
    }
}
