// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::convert::TryFrom;
use std::fmt::Write;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use spk_ident_build::Build;
use spk_name::PkgNameBuf;
use spk_version::Version;

use crate::{parsing, RangeIdent, Result};

/// Parse an identifier from a string.
///
/// This will panic if the identifier is wrong,
/// and should only be used for testing.
///
/// ```
/// # #[macro_use] extern crate spk_ident;
/// # fn main() {
/// ident!("my-pkg/1.0.0");
/// # }
/// ```
#[macro_export]
macro_rules! ident {
    ($ident:literal) => {
        $crate::parse_ident($ident).unwrap()
    };
}

/// Ident represents a concrete package identifier.
///
/// Names a single package, optionally at a specific version and build.
#[derive(Clone, Hash, PartialEq, Eq, Ord, PartialOrd)]
pub struct Ident {
    pub name: PkgNameBuf,
    pub version: Version,
    pub build: Option<Build>,
}

impl std::fmt::Debug for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Ident").field(&self.to_string()).finish()
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name.as_str())?;
        if let Some(vb) = self.version_and_build() {
            f.write_char('/')?;
            f.write_str(vb.as_str())?;
        }
        Ok(())
    }
}

impl Ident {
    pub fn new(name: PkgNameBuf) -> Self {
        Self {
            name,
            version: Default::default(),
            build: Default::default(),
        }
    }

    /// Return true if this identifier is for a source package.
    pub fn is_source(&self) -> bool {
        match &self.build {
            Some(build) => build.is_source(),
            None => false,
        }
    }

    /// Return a copy of this identifier with the given version number instead.
    pub fn with_version(&self, version: Version) -> Ident {
        Self {
            name: self.name.clone(),
            version,
            build: self.build.clone(),
        }
    }

    /// Set the build component of this package identifier.
    pub fn set_build(&mut self, build: Option<Build>) {
        self.build = build;
    }

    /// Return a copy of this identifier with the given build replaced.
    pub fn with_build(&self, build: Option<Build>) -> Self {
        let mut new = self.clone();
        new.build = build;
        new
    }

    /// Turn this identifier into one for the given build.
    pub fn into_build(mut self, build: Build) -> Self {
        self.build = Some(build);
        self
    }

    /// A string containing the properly formatted version number and build.
    ///
    /// This is the same as [`ToString::to_string`] when the build is None
    /// and the version is zero.
    pub fn version_and_build(&self) -> Option<String> {
        match &self.build {
            Some(build) => Some(format!("{}/{}", self.version, build.digest_str())),
            None => {
                if self.version.is_zero() {
                    None
                } else {
                    Some(self.version.to_string())
                }
            }
        }
    }
}

impl From<PkgNameBuf> for Ident {
    fn from(n: PkgNameBuf) -> Self {
        Self::new(n)
    }
}

impl TryFrom<RangeIdent> for Ident {
    type Error = crate::Error;

    fn try_from(ri: RangeIdent) -> Result<Self> {
        let name = ri.name;
        let build = ri.build;
        let version = ri.version.try_into_version()?;
        Ok(Self {
            name,
            version,
            build,
        })
    }
}

impl TryFrom<&RangeIdent> for Ident {
    type Error = crate::Error;

    fn try_from(ri: &RangeIdent) -> Result<Self> {
        let version = ri.version.clone().try_into_version()?;
        Ok(Self {
            name: ri.name.clone(),
            version,
            build: ri.build.clone(),
        })
    }
}

impl TryFrom<&str> for Ident {
    type Error = crate::Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::from_str(value)
    }
}

impl TryFrom<String> for Ident {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_str(value.as_str())
    }
}

impl FromStr for Ident {
    type Err = crate::Error;

    /// Parse the given identifier string into this instance.
    fn from_str(source: &str) -> Result<Self> {
        parsing::ident(source)
            .map(|(_, ident)| ident)
            .map_err(|err| match err {
                nom::Err::Error(e) | nom::Err::Failure(e) => crate::Error::String(e.to_string()),
                nom::Err::Incomplete(_) => unreachable!(),
            })
    }
}

/// Parse a package identifier string.
pub fn parse_ident<S: AsRef<str>>(source: S) -> Result<Ident> {
    Ident::from_str(source.as_ref())
}

impl Serialize for Ident {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod ident_test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("package")]
    #[case("package/1.1.0")]
    #[case("package/2.0.0.1")]
    fn test_ident_to_str(#[case] input: &str) {
        let ident = parse_ident(input).unwrap();
        let out = ident.to_string();
        assert_eq!(out, input);
    }

    #[rstest]
    fn test_ident_to_yaml() {
        let ident = Ident::from_str("package").unwrap();
        let out = serde_yaml::to_string(&ident).unwrap();
        assert_eq!(&out, "---\npackage\n");
    }

    #[rstest]
    fn test_ident_with_build() {
        let opts = spk_option_map::OptionMap::default();
        let build = Build::digest_from_options(&opts);
        let ident = Ident::from_str("package/1.0.0").unwrap().into_build(build.clone());
        assert_eq!(ident.build, Some(build));
        assert!(!ident.is_source());
    }
}
