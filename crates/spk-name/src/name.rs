// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::borrow::Borrow;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{parsing, Error, Result};

/// Generates a borrowed/owned pair of name newtypes backed by a shared
/// nom parser, the way the name grammars that feed identifiers are paired
/// elsewhere in this codebase (one unsized borrowed form, one owned buffer).
macro_rules! name_type {
    ($borrowed:ident, $owned:ident, $parser:path, $what:literal) => {
        #[doc = concat!("A borrowed, validated ", $what, " name.")]
        #[derive(Hash, PartialEq, Eq, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $borrowed(str);

        impl $borrowed {
            /// Validate and borrow `s` as a
            #[doc = $what]
            /// name.
            pub fn new<S: AsRef<str> + ?Sized>(s: &S) -> Result<&Self> {
                let s = s.as_ref();
                validate_name(s, $parser, $what)?;
                // Safety: `$borrowed` is a transparent wrapper around `str`
                Ok(unsafe { &*(s as *const str as *const Self) })
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ToOwned for $borrowed {
            type Owned = $owned;

            fn to_owned(&self) -> Self::Owned {
                $owned(self.0.to_owned())
            }
        }

        impl AsRef<str> for $borrowed {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<$borrowed> for $borrowed {
            fn as_ref(&self) -> &$borrowed {
                self
            }
        }

        impl fmt::Display for $borrowed {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $borrowed {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(&self.0, f)
            }
        }

        #[doc = concat!("An owned, validated ", $what, " name.")]
        #[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $owned(String);

        impl $owned {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $owned {
            type Target = $borrowed;

            fn deref(&self) -> &Self::Target {
                // Safety: construction validates the same grammar as `$borrowed::new`
                unsafe { &*(self.0.as_str() as *const str as *const $borrowed) }
            }
        }

        impl Borrow<$borrowed> for $owned {
            fn borrow(&self) -> &$borrowed {
                self
            }
        }

        impl AsRef<str> for $owned {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<$borrowed> for $owned {
            fn as_ref(&self) -> &$borrowed {
                self
            }
        }

        impl fmt::Display for $owned {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $owned {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(&self.0, f)
            }
        }

        impl FromStr for $owned {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                validate_name(s, $parser, $what)?;
                Ok(Self(s.to_owned()))
            }
        }

        impl TryFrom<&str> for $owned {
            type Error = Error;

            fn try_from(s: &str) -> Result<Self> {
                Self::from_str(s)
            }
        }

        impl TryFrom<String> for $owned {
            type Error = Error;

            fn try_from(s: String) -> Result<Self> {
                validate_name(&s, $parser, $what)?;
                Ok(Self(s))
            }
        }

        impl Serialize for $owned {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $owned {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::try_from(s).map_err(de::Error::custom)
            }
        }
    };
}

fn validate_name(
    s: &str,
    parser: fn(&str) -> nom::IResult<&str, &str>,
    what: &'static str,
) -> Result<()> {
    if s.is_empty() {
        return Err(Error::InvalidNameError(
            s.to_owned(),
            format!("{what} name may not be empty"),
        ));
    }
    parser(s)
        .map(|_| ())
        .map_err(|_| Error::InvalidNameError(s.to_owned(), format!("not a valid {what} name")))
}

name_type!(PkgName, PkgNameBuf, parsing::package_name, "package");
name_type!(OptName, OptNameBuf, parsing::opt_name, "option");
name_type!(
    RepositoryName,
    RepositoryNameBuf,
    parsing::repository_name,
    "repository"
);

impl OptName {
    /// The option namespace that this name is qualified under, if any
    /// (the portion before the last `.`), eg `Some("python")` for `python.abi`.
    pub fn namespace(&self) -> Option<&PkgName> {
        let (ns, _) = self.as_str().rsplit_once('.')?;
        PkgName::new(ns).ok()
    }

    /// This option name with any package namespace stripped.
    pub fn without_namespace(&self) -> &OptName {
        match self.as_str().rsplit_once('.') {
            Some((_, rest)) => OptName::new(rest).expect("suffix of a valid option name is valid"),
            None => self,
        }
    }

    /// Standard option name used to select the operating system.
    pub fn os() -> &'static OptName {
        OptName::new("os").expect("'os' is a valid option name")
    }

    /// Standard option name used to select the cpu architecture.
    pub fn arch() -> &'static OptName {
        OptName::new("arch").expect("'arch' is a valid option name")
    }

    /// Standard option name used to select the host distribution.
    pub fn distro() -> &'static OptName {
        OptName::new("distro").expect("'distro' is a valid option name")
    }
}

#[cfg(test)]
mod name_test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("python")]
    #[case("my-pkg")]
    #[case("my_pkg")]
    fn test_valid_pkg_names(#[case] name: &str) {
        PkgName::new(name).unwrap();
    }

    #[rstest]
    #[case("")]
    #[case("Python")]
    #[case("1abc")]
    #[case("has space")]
    fn test_invalid_pkg_names(#[case] name: &str) {
        assert!(PkgName::new(name).is_err());
    }

    #[test]
    fn test_opt_namespace() {
        let name = OptNameBuf::try_from("python.abi").unwrap();
        assert_eq!(name.namespace().unwrap().as_str(), "python");
        assert_eq!(name.without_namespace().as_str(), "abi");

        let name = OptNameBuf::try_from("debug").unwrap();
        assert!(name.namespace().is_none());
        assert_eq!(name.without_namespace().as_str(), "debug");
    }
}
