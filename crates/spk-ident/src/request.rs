// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use spk_ident_build::Build;
use spk_name::PkgNameBuf;
use spk_version::Compatibility;

use crate::{Error, RangeIdent, Result};

/// Whether a request accepts pre-release versions of the named package.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreReleasePolicy {
    #[default]
    ExcludeAll,
    IncludeAll,
}

/// Whether a request must always be satisfied, or only when the named
/// package is already otherwise being considered.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InclusionPolicy {
    #[default]
    Always,
    IfAlreadyPresent,
}

/// A declaration that some package must appear in the solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub pkg: RangeIdent,
    pub prerelease_policy: PreReleasePolicy,
    pub inclusion_policy: InclusionPolicy,
    /// An unresolved template (eg `fromBuildEnv`) that must be rendered
    /// against a concrete solution before this request can be used to
    /// select a candidate. `None` once rendered or if never templated.
    pub pin: Option<String>,
}

impl Request {
    /// A default, unconstrained request for `name`.
    pub fn new(name: PkgNameBuf) -> Self {
        Self {
            pkg: RangeIdent::any(name),
            prerelease_policy: PreReleasePolicy::default(),
            inclusion_policy: InclusionPolicy::default(),
            pin: None,
        }
    }

    pub fn name(&self) -> &spk_name::PkgName {
        &self.pkg.name
    }

    /// Report whether the given build satisfies this request, given
    /// the resolved version and build.
    pub fn is_satisfied_by(&self, version: &spk_version::Version, build: Option<&Build>) -> Compatibility {
        let compat = self.pkg.is_version_applicable(version);
        if !compat.is_ok() {
            return compat;
        }
        if self.prerelease_policy == PreReleasePolicy::ExcludeAll && !version.pre.is_empty() {
            return Compatibility::incompatible(format!("{version} is a pre-release"));
        }
        match build {
            Some(b) => self.pkg.is_build_applicable(b),
            None => Compatibility::Compatible,
        }
    }

    /// Merge `other` into this request, intersecting ranges and
    /// combining policies. The more restrictive policy always wins:
    /// `ExcludeAll` dominates over `IncludeAll`, and `Always` dominates
    /// over `IfAlreadyPresent`.
    ///
    /// Returns a terminal [`Error::ConflictingRequestsError`] when the
    /// two requests have an empty range intersection or incompatible
    /// build constraints.
    pub fn restrict(&mut self, other: &Self) -> Result<()> {
        self.pkg = self.pkg.intersect(&other.pkg)?;
        if other.prerelease_policy == PreReleasePolicy::ExcludeAll {
            self.prerelease_policy = PreReleasePolicy::ExcludeAll;
        }
        if other.inclusion_policy == InclusionPolicy::Always {
            self.inclusion_policy = InclusionPolicy::Always;
        }
        if self.pin.is_none() {
            self.pin = other.pin.clone();
        }
        Ok(())
    }

    /// Whether this request currently fires given that `name_is_pending`
    /// reports if a request for this package's name has already been
    /// introduced elsewhere in the effective decision state.
    pub fn is_active(&self, name_is_pending: bool) -> bool {
        match self.inclusion_policy {
            InclusionPolicy::Always => true,
            InclusionPolicy::IfAlreadyPresent => name_is_pending,
        }
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.pkg.fmt(f)
    }
}

impl FromStr for Request {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self> {
        Ok(Self::new_from_range(RangeIdent::from_str(source)?))
    }
}

impl Request {
    fn new_from_range(pkg: RangeIdent) -> Self {
        Self {
            pkg,
            prerelease_policy: PreReleasePolicy::default(),
            inclusion_policy: InclusionPolicy::default(),
            pin: None,
        }
    }
}

#[cfg(test)]
mod request_test {
    use rstest::rstest;

    use super::*;

    fn req(s: &str) -> Request {
        Request::from_str(s).unwrap()
    }

    #[test]
    fn test_restrict_intersects_ranges() {
        let mut a = req("hello/>=1.0.0");
        let b = req("hello/<2.0.0");
        a.restrict(&b).unwrap();
        assert!(a
            .is_satisfied_by(&"1.5.0".parse().unwrap(), None)
            .is_ok());
        assert!(!a
            .is_satisfied_by(&"2.5.0".parse().unwrap(), None)
            .is_ok());
    }

    #[test]
    fn test_restrict_conflicting_ranges_errors() {
        let mut a = req("hello/>=2.0.0");
        let b = req("hello/<2.0.0");
        assert!(matches!(
            a.restrict(&b),
            Err(Error::ConflictingRequestsError { .. })
        ));
    }

    #[rstest]
    #[case(PreReleasePolicy::ExcludeAll, PreReleasePolicy::IncludeAll, PreReleasePolicy::ExcludeAll)]
    #[case(PreReleasePolicy::IncludeAll, PreReleasePolicy::IncludeAll, PreReleasePolicy::IncludeAll)]
    fn test_restrict_prerelease_policy_dominance(
        #[case] a: PreReleasePolicy,
        #[case] b: PreReleasePolicy,
        #[case] expected: PreReleasePolicy,
    ) {
        let mut ra = req("hello");
        ra.prerelease_policy = a;
        let mut rb = req("hello");
        rb.prerelease_policy = b;
        ra.restrict(&rb).unwrap();
        assert_eq!(ra.prerelease_policy, expected);
    }

    #[rstest]
    #[case(InclusionPolicy::IfAlreadyPresent, InclusionPolicy::Always, InclusionPolicy::Always)]
    #[case(InclusionPolicy::IfAlreadyPresent, InclusionPolicy::IfAlreadyPresent, InclusionPolicy::IfAlreadyPresent)]
    fn test_restrict_inclusion_policy_dominance(
        #[case] a: InclusionPolicy,
        #[case] b: InclusionPolicy,
        #[case] expected: InclusionPolicy,
    ) {
        let mut ra = req("hello");
        ra.inclusion_policy = a;
        let mut rb = req("hello");
        rb.inclusion_policy = b;
        ra.restrict(&rb).unwrap();
        assert_eq!(ra.inclusion_policy, expected);
    }

    #[test]
    fn test_is_active() {
        let mut r = req("hello");
        r.inclusion_policy = InclusionPolicy::IfAlreadyPresent;
        assert!(!r.is_active(false));
        assert!(r.is_active(true));
    }
}
