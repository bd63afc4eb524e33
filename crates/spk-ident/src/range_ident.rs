// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::fmt::Write;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use spk_ident_build::Build;
use spk_name::PkgNameBuf;
use spk_version::{Compatibility, Version};
use spk_version_range::{Ranged, VersionRange};

use crate::{parsing, Error, Result};

/// An identifier for a range of acceptable package builds: a name, a
/// [`VersionRange`] and an optional [`Build`] constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeIdent {
    pub name: PkgNameBuf,
    pub version: VersionRange,
    pub build: Option<Build>,
}

impl RangeIdent {
    /// A range ident that accepts any version or build of `name`.
    pub fn any(name: PkgNameBuf) -> Self {
        Self {
            name,
            version: VersionRange::LowerBound(spk_version_range::LowerBound(Version::default())),
            build: None,
        }
    }

    /// Report whether `version` satisfies this range's version constraint.
    pub fn is_version_applicable(&self, version: &Version) -> Compatibility {
        self.version.is_applicable(version)
    }

    /// Report whether the given build satisfies this range's build constraint.
    pub fn is_build_applicable(&self, build: &Build) -> Compatibility {
        match &self.build {
            None => Compatibility::Compatible,
            Some(b) if b == build => Compatibility::Compatible,
            Some(b) => Compatibility::incompatible(format!("build {build} does not match required {b}")),
        }
    }

    /// Narrow this range ident's version and build constraints by those
    /// of `other`, which must name the same package.
    ///
    /// Returns the new combined range, or an error if the two have an
    /// empty intersection.
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        if self.name != other.name {
            return Err(Error::ConflictingRequestsError {
                name: self.name.to_string(),
                reason: format!("cannot combine request for '{}' with '{}'", self.name, other.name),
            });
        }
        let version = self.version.intersect(&other.version).ok_or_else(|| {
            Error::ConflictingRequestsError {
                name: self.name.to_string(),
                reason: format!("{} and {} have no overlapping versions", self.version, other.version),
            }
        })?;
        let build = match (&self.build, &other.build) {
            (None, b) => b.clone(),
            (b, None) => b.clone(),
            (Some(a), Some(b)) if a == b => Some(a.clone()),
            (Some(a), Some(b)) => {
                return Err(Error::ConflictingRequestsError {
                    name: self.name.to_string(),
                    reason: format!("build {a} conflicts with required build {b}"),
                })
            }
        };
        Ok(Self {
            name: self.name.clone(),
            version,
            build,
        })
    }

    /// Convert into an exact [`Version`], when this range names exactly
    /// one acceptable version (an `=x.y.z` range).
    pub fn try_into_version(self) -> Result<Version> {
        match self.version {
            VersionRange::Equal(e) => Ok(e.0),
            other => Err(Error::String(format!(
                "range '{other}' does not identify a single exact version"
            ))),
        }
    }
}

impl std::fmt::Display for RangeIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name.as_str())?;
        let is_unconstrained = matches!(
            &self.version,
            VersionRange::LowerBound(spk_version_range::LowerBound(v)) if v.is_zero()
        );
        if !is_unconstrained {
            f.write_char('/')?;
            f.write_str(&self.version.to_string())?;
        } else if self.build.is_some() {
            f.write_str("/Any")?;
        }
        if let Some(build) = &self.build {
            f.write_char('/')?;
            f.write_str(&build.digest_str())?;
        }
        Ok(())
    }
}

impl FromStr for RangeIdent {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self> {
        parsing::range_ident(source)
            .map(|(_, ri)| ri)
            .map_err(|err| match err {
                nom::Err::Error(e) | nom::Err::Failure(e) => Error::String(e.to_string()),
                nom::Err::Incomplete(_) => unreachable!(),
            })
    }
}

impl Serialize for RangeIdent {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RangeIdent {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod range_ident_test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("hello", "hello")]
    #[case("hello/1.0.0", "hello/1.0.0")]
    fn test_range_ident_to_str(#[case] input: &str, #[case] expected: &str) {
        let ri = RangeIdent::from_str(input).unwrap();
        assert_eq!(ri.to_string(), expected);
    }

    #[test]
    fn test_intersect_narrows() {
        let a = RangeIdent::from_str("hello/>=1.0.0").unwrap();
        let b = RangeIdent::from_str("hello/<2.0.0").unwrap();
        let combined = a.intersect(&b).unwrap();
        assert!(combined.is_version_applicable(&"1.5.0".parse().unwrap()).is_ok());
        assert!(!combined.is_version_applicable(&"2.5.0".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_intersect_conflict() {
        let a = RangeIdent::from_str("hello/>=2.0.0").unwrap();
        let b = RangeIdent::from_str("hello/<2.0.0").unwrap();
        assert!(a.intersect(&b).is_err());
    }

    #[test]
    fn test_intersect_different_name_is_conflict() {
        let a = RangeIdent::from_str("hello").unwrap();
        let b = RangeIdent::from_str("goodbye").unwrap();
        assert!(a.intersect(&b).is_err());
    }
}
