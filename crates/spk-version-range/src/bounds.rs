// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use spk_version::Version;

/// A conservative summary of the versions a range predicate accepts,
/// used only to detect an empty intersection between two ranges
/// without having to enumerate the (infinite) version space.
#[derive(Clone, Debug, Default)]
pub struct Bounds {
    /// inclusive lower bound
    pub low: Option<Version>,
    /// exclusive upper bound
    pub high: Option<Version>,
    /// an exact version that must match, if this range is a pin-point
    pub exact: Option<Version>,
}

impl Bounds {
    pub fn exact(v: Version) -> Self {
        Self {
            low: None,
            high: None,
            exact: Some(v),
        }
    }

    pub fn at_least(v: Version) -> Self {
        Self {
            low: Some(v),
            high: None,
            exact: None,
        }
    }

    pub fn at_least_below(low: Version, high: Version) -> Self {
        Self {
            low: Some(low),
            high: Some(high),
            exact: None,
        }
    }

    pub fn below(v: Version) -> Self {
        Self {
            low: None,
            high: Some(v),
            exact: None,
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Combine with another set of bounds, returning `None` if the
    /// intersection is provably empty.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        match (&self.exact, &other.exact) {
            (Some(a), Some(b)) => {
                return if a == b { Some(Self::exact(a.clone())) } else { None };
            }
            (Some(a), None) => {
                return if other.accepts(a) {
                    Some(Self::exact(a.clone()))
                } else {
                    None
                };
            }
            (None, Some(b)) => {
                return if self.accepts(b) {
                    Some(Self::exact(b.clone()))
                } else {
                    None
                };
            }
            (None, None) => {}
        }

        let low = match (&self.low, &other.low) {
            (Some(a), Some(b)) => Some(a.max(b).clone()),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        let high = match (&self.high, &other.high) {
            (Some(a), Some(b)) => Some(a.min(b).clone()),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        if let (Some(low), Some(high)) = (&low, &high) {
            if low >= high {
                return None;
            }
        }
        Some(Self {
            low,
            high,
            exact: None,
        })
    }

    fn accepts(&self, v: &Version) -> bool {
        if let Some(low) = &self.low {
            if v < low {
                return false;
            }
        }
        if let Some(high) = &self.high {
            if v >= high {
                return false;
            }
        }
        true
    }
}
