// Copyright (c) 2022 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use spk_ident::Ident;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Package not found: {0}")]
    PackageNotFound(Ident),
    #[error("Version not found for {0}/{1}")]
    VersionNotFound(spk_name::PkgNameBuf, spk_version::Version),
    #[error("Spec already exists and force was not given: {0}")]
    SpecAlreadyExists(Ident),
    #[error("Package already exists and force was not given: {0}")]
    PackageAlreadyExists(Ident),
    #[error(transparent)]
    SpkIdentError(#[from] spk_ident::Error),
    #[error(transparent)]
    SpkNameError(#[from] spk_name::Error),
    #[error(transparent)]
    SpkSpecError(#[from] spk_spec::Error),
    #[error("Error: {0}")]
    String(String),
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::String(err)
    }
}
