// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

mod builder;
mod error;
mod in_memory_runtime;
mod runtime;
mod validation;

pub use builder::Builder;
pub use error::{BuildError, Error, Result};
pub use in_memory_runtime::InMemoryRuntime;
pub use runtime::{Diff, DiffMode, Layer, Runtime, PREFIX};
pub use validation::validate_build_changeset;
