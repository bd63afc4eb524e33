// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

#![deny(unsafe_op_in_unsafe_fn)]

mod error;
mod option;
mod pin;
mod source;
mod spec;

pub use error::{Error, Result};
pub use option::{Opt, PkgOpt, VarOpt};
pub use pin::render_pin;
pub use source::{LocalSource, SourceSpec};
pub use spec::{InstallSpec, Spec};
