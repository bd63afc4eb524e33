// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::char;
use nom::combinator::{all_consuming, map, map_res, value};
use nom::multi::separated_list1;
use nom::sequence::preceded;
use nom::IResult;
use spk_version::Version;

use crate::ranges::{CaretRange, EqualRange, LowerBound, TildeRange, UpperBound, VersionRange, WildcardRange};

fn version_str(input: &str) -> IResult<&str, Version> {
    map_res(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '+'),
        |s: &str| s.parse::<Version>(),
    )(input)
}

fn wildcard(input: &str) -> IResult<&str, VersionRange> {
    map(
        separated_list1(
            char('.'),
            alt((
                value(None, char('*')),
                map_res(nom::character::complete::digit1, |s: &str| {
                    s.parse::<u32>().map(Some)
                }),
            )),
        ),
        |parts| {
            if parts.iter().any(Option::is_none) {
                Some(VersionRange::Wildcard(WildcardRange(parts)))
            } else {
                None
            }
        },
    )(input)
    .and_then(|(rest, maybe)| {
        maybe.map(|r| (rest, r)).ok_or_else(|| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify))
        })
    })
}

fn one_range(input: &str) -> IResult<&str, VersionRange> {
    alt((
        map(preceded(tag(">="), version_str), |v| {
            VersionRange::LowerBound(LowerBound(v))
        }),
        map(preceded(char('<'), version_str), |v| {
            VersionRange::UpperBound(UpperBound(v))
        }),
        map(preceded(char('='), version_str), |v| {
            VersionRange::Equal(EqualRange(v))
        }),
        map(preceded(char('^'), version_str), |v| {
            VersionRange::Caret(CaretRange(v))
        }),
        map(preceded(char('~'), version_str), |v| {
            VersionRange::Tilde(TildeRange(v))
        }),
        wildcard,
        map(version_str, |v| VersionRange::Caret(CaretRange(v))),
    ))(input)
}

pub fn version_range(input: &str) -> IResult<&str, VersionRange> {
    all_consuming(map(separated_list1(char(','), one_range), |mut ranges| {
        if ranges.len() == 1 {
            ranges.remove(0)
        } else {
            VersionRange::Filter(crate::ranges::Filter(ranges))
        }
    }))(input)
}
