// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::fmt;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use spk_version::{Compatibility, Version};

use crate::bounds::Bounds;
use crate::{parsing, Error, Result};

/// A predicate over versions, shared by every variant of [`VersionRange`].
#[enum_dispatch]
pub trait Ranged: fmt::Display {
    /// Report whether `version` satisfies this range.
    fn is_applicable(&self, version: &Version) -> Compatibility;

    /// A conservative [`Bounds`] summary of this range, used to detect
    /// an empty intersection between two ranges without enumerating
    /// the version space.
    fn bounds(&self) -> Bounds;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EqualRange(pub Version);

impl Ranged for EqualRange {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        if version == &self.0 {
            Compatibility::Compatible
        } else {
            Compatibility::incompatible(format!("{version} != {}", self.0))
        }
    }

    fn bounds(&self) -> Bounds {
        Bounds::exact(self.0.clone())
    }
}

impl fmt::Display for EqualRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "={}", self.0)
    }
}

/// `^1.2.3`: compatible with `1.2.3` up to (but excluding) the next
/// increment of the leftmost nonzero component, semver style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaretRange(pub Version);

impl CaretRange {
    fn upper(&self) -> Version {
        let mut parts = self.0.parts.clone();
        if parts.is_empty() {
            parts.push(0);
        }
        let bump_at = parts.iter().position(|p| *p != 0).unwrap_or(0);
        parts[bump_at] += 1;
        for p in parts.iter_mut().skip(bump_at + 1) {
            *p = 0;
        }
        Version::new(parts)
    }
}

impl Ranged for CaretRange {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        let bounds = self.bounds();
        if version >= bounds.low.as_ref().unwrap() && version < bounds.high.as_ref().unwrap() {
            Compatibility::Compatible
        } else {
            Compatibility::incompatible(format!("{version} not in ^{}", self.0))
        }
    }

    fn bounds(&self) -> Bounds {
        Bounds::at_least_below(self.0.clone(), self.upper())
    }
}

impl fmt::Display for CaretRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^{}", self.0)
    }
}

/// `~1.2.3`: compatible with `1.2.3` up to (but excluding) the next
/// increment of the second component (or the first, if there is only one).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TildeRange(pub Version);

impl TildeRange {
    fn upper(&self) -> Version {
        let mut parts = self.0.parts.clone();
        if parts.len() < 2 {
            parts.resize(1, 0);
            parts[0] += 1;
            return Version::new(parts);
        }
        parts.truncate(2);
        parts[1] += 1;
        Version::new(parts)
    }
}

impl Ranged for TildeRange {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        let bounds = self.bounds();
        if version >= bounds.low.as_ref().unwrap() && version < bounds.high.as_ref().unwrap() {
            Compatibility::Compatible
        } else {
            Compatibility::incompatible(format!("{version} not in ~{}", self.0))
        }
    }

    fn bounds(&self) -> Bounds {
        Bounds::at_least_below(self.0.clone(), self.upper())
    }
}

impl fmt::Display for TildeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LowerBound(pub Version);

impl Ranged for LowerBound {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        if version >= &self.0 {
            Compatibility::Compatible
        } else {
            Compatibility::incompatible(format!("{version} < {}", self.0))
        }
    }

    fn bounds(&self) -> Bounds {
        Bounds::at_least(self.0.clone())
    }
}

impl fmt::Display for LowerBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">={}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpperBound(pub Version);

impl Ranged for UpperBound {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        if version < &self.0 {
            Compatibility::Compatible
        } else {
            Compatibility::incompatible(format!("{version} >= {}", self.0))
        }
    }

    fn bounds(&self) -> Bounds {
        Bounds::below(self.0.clone())
    }
}

impl fmt::Display for UpperBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.0)
    }
}

/// `1.2.*`: each `Some(n)` component must match exactly; `None` components
/// (the `*`) are unconstrained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardRange(pub Vec<Option<u32>>);

impl Ranged for WildcardRange {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        for (i, want) in self.0.iter().enumerate() {
            let Some(want) = want else { continue };
            let have = version.parts.get(i).copied().unwrap_or(0);
            if have != *want {
                return Compatibility::incompatible(format!("{version} does not match {self}"));
            }
        }
        Compatibility::Compatible
    }

    fn bounds(&self) -> Bounds {
        // wildcards may match arbitrarily high/low versions in the
        // free (`*`) trailing positions, so no tight bound is possible
        // in general; fall back to unbounded and rely on is_applicable.
        Bounds::unbounded()
    }
}

impl fmt::Display for WildcardRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(|p| p.map(|n| n.to_string()).unwrap_or_else(|| "*".to_string()))
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&rendered)
    }
}

/// The intersection of a list of sub-ranges, as produced by a
/// comma-separated range expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter(pub Vec<VersionRange>);

impl Ranged for Filter {
    fn is_applicable(&self, version: &Version) -> Compatibility {
        for sub in &self.0 {
            let compat = sub.is_applicable(version);
            if !compat.is_ok() {
                return compat;
            }
        }
        Compatibility::Compatible
    }

    fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::unbounded();
        for sub in &self.0 {
            match bounds.intersect(&sub.bounds()) {
                Some(next) => bounds = next,
                None => return Bounds {
                    low: Some(Version::new(vec![u32::MAX])),
                    high: Some(Version::new(vec![0])),
                    exact: None,
                },
            }
        }
        bounds
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(VersionRange::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&rendered)
    }
}

/// A predicate over versions.
#[enum_dispatch(Ranged)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionRange {
    Equal(EqualRange),
    Caret(CaretRange),
    Tilde(TildeRange),
    LowerBound(LowerBound),
    UpperBound(UpperBound),
    Wildcard(WildcardRange),
    Filter(Filter),
}

impl VersionRange {
    /// Intersect this range with another, returning `None` when the
    /// result is provably empty (a conflict).
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        // exact ranges and filters benefit from sampling their members
        // directly; everything else is combined through conservative
        // bounds, then re-wrapped as a Filter so `is_applicable` still
        // consults every original sub-range.
        if self.bounds().intersect(&other.bounds()).is_none() {
            return None;
        }
        let mut combined = Vec::new();
        match self {
            VersionRange::Filter(f) => combined.extend(f.0.clone()),
            other => combined.push(other.clone()),
        }
        match other {
            VersionRange::Filter(f) => combined.extend(f.0.clone()),
            o => combined.push(o.clone()),
        }
        Some(VersionRange::Filter(Filter(combined)))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Equal(r) => r.fmt(f),
            VersionRange::Caret(r) => r.fmt(f),
            VersionRange::Tilde(r) => r.fmt(f),
            VersionRange::LowerBound(r) => r.fmt(f),
            VersionRange::UpperBound(r) => r.fmt(f),
            VersionRange::Wildcard(r) => r.fmt(f),
            VersionRange::Filter(r) => r.fmt(f),
        }
    }
}

impl FromStr for VersionRange {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self> {
        parsing::version_range(source)
            .map(|(_, r)| r)
            .map_err(|_| Error::InvalidRangeError(source.to_owned(), "not a valid version range".into()))
    }
}

impl Serialize for VersionRange {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}
