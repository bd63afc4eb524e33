// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid build '{0}': {1}")]
    InvalidBuildError(String, String),
}

pub type Result<T> = std::result::Result<T, Error>;
