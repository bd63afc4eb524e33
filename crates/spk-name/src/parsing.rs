// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::combinator::{all_consuming, recognize, verify};
use nom::multi::separated_list1;
use nom::IResult;

fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

/// A single name component: lowercase letter/digit/`-`/`_`, may not start with a digit.
fn name_component(input: &str) -> IResult<&str, &str> {
    recognize(verify(take_while1(is_name_char), |s: &str| {
        s.chars().next().map(|c| !c.is_ascii_digit()).unwrap_or(false)
    }))(input)
}

/// A package name is a single name component.
pub fn package_name(input: &str) -> IResult<&str, &str> {
    all_consuming(name_component)(input)
}

/// An option name is one or more name components separated by `.`,
/// used to namespace a package-specific option (`pkgname.optname`).
pub fn opt_name(input: &str) -> IResult<&str, &str> {
    all_consuming(recognize(separated_list1(char('.'), name_component)))(input)
}

/// A repository name is a single name component.
pub fn repository_name(input: &str) -> IResult<&str, &str> {
    all_consuming(name_component)(input)
}
