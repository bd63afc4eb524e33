// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::fmt;

/// The result of a compatibility check: either the two things being
/// compared are compatible, or they are not and a human-readable reason
/// is attached to explain why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Compatibility {
    Compatible,
    Incompatible(String),
}

impl Compatibility {
    pub fn incompatible<S: Into<String>>(reason: S) -> Self {
        Self::Incompatible(reason.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Compatible)
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatible => f.write_str("compatible"),
            Self::Incompatible(reason) => f.write_str(reason),
        }
    }
}

impl From<Compatibility> for bool {
    fn from(value: Compatibility) -> Self {
        value.is_ok()
    }
}

impl From<&Compatibility> for bool {
    fn from(value: &Compatibility) -> Self {
        value.is_ok()
    }
}

impl std::ops::Not for Compatibility {
    type Output = bool;

    fn not(self) -> Self::Output {
        !self.is_ok()
    }
}

#[cfg(test)]
mod compat_test {
    use super::*;

    #[test]
    fn test_compatible_is_truthy() {
        assert!(bool::from(Compatibility::Compatible));
        assert!(!bool::from(Compatibility::incompatible("nope")));
    }
}
