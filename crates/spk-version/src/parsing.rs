// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use nom::bytes::complete::take_while1;
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res, opt};
use nom::multi::separated_list1;
use nom::sequence::preceded;
use nom::IResult;

use crate::tag_set::TagSet;
use crate::version::Version;

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(input)
}

fn parts(input: &str) -> IResult<&str, Vec<u32>> {
    separated_list1(char('.'), number)(input)
}

fn tag_set(input: &str) -> IResult<&str, TagSet> {
    map_res(
        take_while1(|c: char| c != '+' && c != '-'),
        |s: &str| s.parse::<TagSet>(),
    )(input)
}

pub fn version(input: &str) -> IResult<&str, Version> {
    all_consuming(|input| {
        let (input, parts) = parts(input)?;
        let (input, pre) = opt(preceded(char('-'), tag_set))(input)?;
        let (input, post) = opt(preceded(char('+'), tag_set))(input)?;
        Ok((
            input,
            Version {
                parts,
                pre: pre.unwrap_or_default(),
                post: post.unwrap_or_default(),
            },
        ))
    })(input)
}
