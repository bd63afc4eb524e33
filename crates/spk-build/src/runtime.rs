// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashMap;

use spk_solver_solution::Solution;
use spk_storage::LayerDigest;

use crate::Result;

/// Where resolved packages are mounted and where a build's output is
/// read back from, under any [`Runtime`] implementation.
pub const PREFIX: &str = "/spfs";

/// The kind of change a path underwent between a runtime's mount
/// baseline and its current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffMode {
    Unchanged,
    Added,
    Removed,
    Modified,
}

/// A single path's change, as reported by [`Runtime::diff`].
///
/// `is_dir` describes the entry itself (for [`DiffMode::Modified`], both
/// the old and new entry are directories whenever this is true -- a
/// directory can only ever become or remain a directory).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diff {
    pub path: String,
    pub mode: DiffMode,
    pub is_dir: bool,
}

/// A committed, content-addressed filesystem layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub digest: LayerDigest,
}

/// The filesystem runtime collaborator the [`crate::Builder`] drives to
/// materialize resolved packages, execute a build script, and capture the
/// resulting changeset.
///
/// No production implementation ships in this crate; a real one is
/// expected to be backed by a content-addressed filesystem elsewhere in
/// the stack. [`crate::InMemoryRuntime`] is the only implementation here,
/// used exclusively by this crate's own test suite.
pub trait Runtime {
    /// Materialize every resolved layer in `solution` into this
    /// runtime's stack, in solution order.
    fn configure(&mut self, solution: &Solution) -> Result<()>;

    /// Mark the runtime's upper layer writable (or not).
    fn set_editable(&mut self, editable: bool);

    /// Apply any pending stack changes, making them visible under
    /// [`PREFIX`].
    fn remount(&mut self) -> Result<()>;

    /// Remove `subpath` (relative to [`PREFIX`]) from the runtime's
    /// upper, so it does not appear in a subsequent [`Runtime::diff`].
    fn reset(&mut self, subpath: &str) -> Result<()>;

    /// Write `contents` to `path` (relative to [`PREFIX`]), as the
    /// builder does for the build script and its option dump.
    fn write_file(&mut self, path: &str, contents: &str) -> Result<()>;

    /// The argv a shell should be invoked with so that it sources the
    /// runtime's environment before running `script_path`.
    fn build_shell_initialized_command(&self, script_path: &str) -> Vec<String>;

    /// Run `argv` with working directory `cwd` and environment `env`
    /// extending the runtime's own, blocking until it exits. Returns the
    /// process exit code.
    fn spawn_and_wait(
        &mut self,
        argv: &[String],
        cwd: &str,
        env: &HashMap<String, String>,
    ) -> Result<i32>;

    /// The set of paths under [`PREFIX`] that changed since the runtime
    /// was last [`Runtime::configure`]d.
    fn diff(&self) -> Result<Vec<Diff>>;

    /// Commit the runtime's current upper into a new content-addressed
    /// [`Layer`].
    fn commit_layer(&mut self) -> Result<Layer>;
}
