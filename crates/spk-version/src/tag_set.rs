// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A set of named, numbered tags attached to a version as a pre- or
/// post-release marker, eg `beta.1,rc.0`. Stored sorted by name so
/// that textual form and ordering are both deterministic.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: BTreeMap<String, u32>,
}

impl TagSet {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u32)> {
        self.tags.iter()
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.tags.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: u32) {
        self.tags.insert(name.into(), value);
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .tags
            .iter()
            .map(|(name, value)| format!("{name}.{value}"))
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&rendered)
    }
}

impl FromStr for TagSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tags = BTreeMap::new();
        if s.is_empty() {
            return Ok(Self { tags });
        }
        for entry in s.split(',') {
            let (name, value) = match entry.rsplit_once('.') {
                Some((name, value)) if value.chars().all(|c| c.is_ascii_digit()) => {
                    let value: u32 = value.parse().map_err(|_| {
                        Error::InvalidVersionError(s.to_owned(), format!("invalid tag number in '{entry}'"))
                    })?;
                    (name.to_owned(), value)
                }
                _ => (entry.to_owned(), 0),
            };
            if name.is_empty() {
                return Err(Error::InvalidVersionError(
                    s.to_owned(),
                    format!("empty tag name in '{entry}'"),
                ));
            }
            tags.insert(name, value);
        }
        Ok(Self { tags })
    }
}

impl<'de> serde::Deserialize<'de> for TagSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
