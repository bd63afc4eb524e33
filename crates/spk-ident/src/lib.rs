// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

mod error;
mod ident;
mod parsing;
mod range_ident;
mod request;

pub use error::{Error, Result};
pub use ident::{parse_ident, Ident};
pub use range_ident::RangeIdent;
pub use request::{InclusionPolicy, PreReleasePolicy, Request};
