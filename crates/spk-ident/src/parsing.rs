// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::combinator::{all_consuming, map, map_res, opt};
use nom::sequence::{pair, preceded};
use nom::IResult;
use nom_supreme::error::ErrorTree;
use spk_ident_build::Build;
use spk_version::Version;
use spk_version_range::VersionRange;

use crate::{Ident, RangeIdent};

fn name_str(input: &str) -> IResult<&str, &str, ErrorTree<&str>> {
    take_while1(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')(input)
}

fn version_str(input: &str) -> IResult<&str, Version, ErrorTree<&str>> {
    map_res(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '+'),
        |s: &str| s.parse::<Version>(),
    )(input)
}

fn range_str(input: &str) -> IResult<&str, VersionRange, ErrorTree<&str>> {
    map_res(
        take_while1(|c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '>' | '<' | '=' | '^' | '~' | '*' | ',')
        }),
        |s: &str| s.parse::<VersionRange>(),
    )(input)
}

fn build_str(input: &str) -> IResult<&str, Build, ErrorTree<&str>> {
    map_res(take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'), |s: &str| {
        s.parse::<Build>()
    })(input)
}

/// `name[/version[/build]]`, with an exact version (no ranges).
pub fn ident(input: &str) -> IResult<&str, Ident, ErrorTree<&str>> {
    all_consuming(map(
        pair(name_str, opt(preceded(char('/'), pair(version_str, opt(preceded(char('/'), build_str)))))),
        |(name, rest)| {
            let name = name.parse().expect("validated by name_str char class");
            match rest {
                Some((version, build)) => Ident {
                    name,
                    version,
                    build,
                },
                None => Ident::new(name),
            }
        },
    ))(input)
}

/// `name[/range[/build]]`.
pub fn range_ident(input: &str) -> IResult<&str, RangeIdent, ErrorTree<&str>> {
    all_consuming(map(
        pair(name_str, opt(preceded(char('/'), pair(range_str, opt(preceded(char('/'), build_str)))))),
        |(name, rest)| {
            let name = name.parse().expect("validated by name_str char class");
            match rest {
                Some((version, build)) => RangeIdent { name, version, build },
                None => RangeIdent::any(name),
            }
        },
    ))(input)
}
