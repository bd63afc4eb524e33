// Copyright (c) 2022 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    String(String),

    #[error(transparent)]
    InvalidName(#[from] spk_name::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
