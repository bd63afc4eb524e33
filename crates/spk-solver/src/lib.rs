// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

mod error;
mod solver;

pub use error::{Error, Result};
pub use solver::Solver;
