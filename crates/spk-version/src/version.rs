// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::tag_set::TagSet;
use crate::{parsing, Error, Result};

/// An ordered sequence of numeric components with an optional pre-release
/// tag and an optional post-release tag.
///
/// Ordering: components are compared lexicographically; a version with a
/// pre-release tag sorts strictly below the same version with no tag, and
/// a version with a post-release tag sorts strictly above.
#[derive(Clone, Debug, Default, Eq, Hash)]
pub struct Version {
    pub parts: Vec<u32>,
    pub pre: TagSet,
    pub post: TagSet,
}

impl Version {
    pub fn new(parts: Vec<u32>) -> Self {
        Self {
            parts,
            pre: TagSet::default(),
            post: TagSet::default(),
        }
    }

    /// True if every numeric component is zero and there are no tags,
    /// ie this is the default/unset version.
    pub fn is_zero(&self) -> bool {
        self.parts.iter().all(|p| *p == 0) && self.pre.is_empty() && self.post.is_empty()
    }

    fn parts_padded_cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.parts_padded_cmp(other) {
            Ordering::Equal => {}
            other => return other,
        }
        // a pre-release sorts below having no pre-release at all
        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => {}
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => match self.pre.cmp(&other.pre) {
                Ordering::Equal => {}
                other => return other,
            },
        }
        // a post-release sorts above having no post-release at all
        match (self.post.is_empty(), other.post.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.post.cmp(&other.post),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .parts
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&parts)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        if !self.post.is_empty() {
            write!(f, "+{}", self.post)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self> {
        parsing::version(source)
            .map(|(_, v)| v)
            .map_err(|_| Error::InvalidVersionError(source.to_owned(), "not a valid version".into()))
    }
}

impl TryFrom<&str> for Version {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::from_str(value)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod version_test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1.0.0", "2.0.0")]
    #[case("1.0.0", "1.1.0")]
    #[case("1.0", "1.0.1")]
    #[case("1.0.0-beta.1", "1.0.0")]
    #[case("1.0.0", "1.0.0+post.1")]
    #[case("1.0.0-alpha.1", "1.0.0-beta.1")]
    fn test_ordering(#[case] lesser: &str, #[case] greater: &str) {
        let lesser: Version = lesser.parse().unwrap();
        let greater: Version = greater.parse().unwrap();
        assert!(lesser < greater, "{lesser} should be less than {greater}");
    }

    #[test]
    fn test_round_trip() {
        let v: Version = "1.2.3-beta.1+post.2".parse().unwrap();
        assert_eq!(v.to_string(), "1.2.3-beta.1+post.2");
    }

    #[test]
    fn test_zero_default() {
        assert!(Version::default().is_zero());
    }
}
