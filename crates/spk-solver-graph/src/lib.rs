// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

mod error;
mod graph;

pub use error::{Error, Result};
pub use graph::{Graph, NodeId};
