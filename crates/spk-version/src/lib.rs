// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

mod compat;
mod error;
pub mod parsing;
mod tag_set;
#[allow(clippy::module_inception)]
mod version;

pub use compat::Compatibility;
pub use error::{Error, Result};
pub use tag_set::TagSet;
pub use version::Version;
