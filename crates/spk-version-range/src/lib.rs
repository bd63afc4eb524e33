// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

mod bounds;
mod error;
pub mod parsing;
mod ranges;

pub use bounds::Bounds;
pub use error::{Error, Result};
pub use ranges::{
    CaretRange, EqualRange, Filter, LowerBound, Ranged, TildeRange, UpperBound, VersionRange,
    WildcardRange,
};

#[cfg(test)]
mod range_test {
    use rstest::rstest;
    use spk_version::Version;

    use super::*;

    #[rstest]
    #[case("1.2.3", "1.2.3", true)]
    #[case(">=1.0.0", "1.5.0", true)]
    #[case(">=1.0.0", "0.9.0", false)]
    #[case("<2.0.0", "1.9.0", true)]
    #[case("<2.0.0", "2.0.0", false)]
    #[case("^1.2.0", "1.9.9", true)]
    #[case("^1.2.0", "2.0.0", false)]
    #[case("~1.2.0", "1.2.9", true)]
    #[case("~1.2.0", "1.3.0", false)]
    #[case("1.*.0", "1.5.0", true)]
    #[case("1.*.0", "1.5.1", false)]
    fn test_is_applicable(#[case] range: &str, #[case] version: &str, #[case] expected: bool) {
        let range: VersionRange = range.parse().unwrap();
        let version: Version = version.parse().unwrap();
        assert_eq!(range.is_applicable(&version).is_ok(), expected);
    }

    #[test]
    fn test_filter_parses_comma_list() {
        let range: VersionRange = ">=1.0.0,<2.0.0".parse().unwrap();
        assert!(matches!(range, VersionRange::Filter(_)));
        assert!(range.is_applicable(&"1.5.0".parse().unwrap()).is_ok());
        assert!(!range.is_applicable(&"2.0.0".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_intersect_conflict() {
        let a: VersionRange = ">=2.0.0".parse().unwrap();
        let b: VersionRange = "<2.0.0".parse().unwrap();
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn test_intersect_narrows() {
        let a: VersionRange = ">=1.0.0".parse().unwrap();
        let b: VersionRange = "<2.0.0".parse().unwrap();
        let combined = a.intersect(&b).unwrap();
        assert!(combined.is_applicable(&"1.5.0".parse().unwrap()).is_ok());
        assert!(!combined.is_applicable(&"2.5.0".parse().unwrap()).is_ok());
        assert!(!combined.is_applicable(&"0.5.0".parse().unwrap()).is_ok());
    }
}
