// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::collections::HashMap;

use spk_name::PkgNameBuf;
use spk_solver_solution::Solution;
use spk_storage::LayerDigest;

use crate::runtime::{Diff, DiffMode, Layer, Runtime};
use crate::Result;

type Fs = HashMap<String, bool>;

/// A script hook standing in for an actual shell invocation: given the
/// runtime's current filesystem and the environment it would have been
/// invoked with, mutate the filesystem as the real script would have and
/// return its exit code.
pub type ScriptHook = Box<dyn FnMut(&mut HashMap<String, bool>, &HashMap<String, String>) -> i32>;

/// An in-memory [`Runtime`] standing in for a real filesystem runtime in
/// tests.
///
/// Nothing here touches a disk or spawns a process: [`Runtime::configure`]
/// just records which packages were asked for, and
/// [`Runtime::spawn_and_wait`] defers to a caller-supplied [`ScriptHook`]
/// that mutates the runtime's virtual filesystem directly, the way a real
/// build script would mutate the real one.
#[derive(Default)]
pub struct InMemoryRuntime {
    fs: Fs,
    baseline: Fs,
    editable: bool,
    configured: Vec<PkgNameBuf>,
    written_files: HashMap<String, String>,
    script: Option<ScriptHook>,
}

impl InMemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the behavior [`Runtime::spawn_and_wait`] runs instead of
    /// spawning a real process.
    pub fn with_script(mut self, script: ScriptHook) -> Self {
        self.script = Some(script);
        self
    }

    /// Seed an existing entry as though it were already present before
    /// any resolved package was configured, for tests exercising the
    /// "modifies/removes an existing file" rejection paths.
    pub fn seed(mut self, path: impl Into<String>, is_dir: bool) -> Self {
        self.fs.insert(path.into(), is_dir);
        self
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn configured_packages(&self) -> &[PkgNameBuf] {
        &self.configured
    }

    pub fn written_file(&self, path: &str) -> Option<&str> {
        self.written_files.get(path).map(String::as_str)
    }
}

impl Runtime for InMemoryRuntime {
    fn configure(&mut self, solution: &Solution) -> Result<()> {
        for entry in solution.items() {
            self.configured.push(entry.request.name().to_owned());
        }
        // Each newly configured solution becomes part of the read-only
        // view everything from here on is diffed against, mirroring a
        // real runtime's lower layers.
        self.baseline = self.fs.clone();
        Ok(())
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn remount(&mut self) -> Result<()> {
        // No separate overlay view to refresh in this in-memory model;
        // writes are already visible to `diff` as soon as they happen.
        Ok(())
    }

    fn reset(&mut self, subpath: &str) -> Result<()> {
        self.fs.retain(|path, _| !path.starts_with(subpath));
        Ok(())
    }

    fn write_file(&mut self, path: &str, contents: &str) -> Result<()> {
        self.written_files.insert(path.to_owned(), contents.to_owned());
        self.fs.insert(path.to_owned(), false);
        Ok(())
    }

    fn build_shell_initialized_command(&self, script_path: &str) -> Vec<String> {
        vec!["/bin/sh".to_owned(), "-e".to_owned(), script_path.to_owned()]
    }

    fn spawn_and_wait(
        &mut self,
        _argv: &[String],
        _cwd: &str,
        env: &HashMap<String, String>,
    ) -> Result<i32> {
        match self.script.as_mut() {
            Some(script) => Ok(script(&mut self.fs, env)),
            None => Ok(0),
        }
    }

    fn diff(&self) -> Result<Vec<Diff>> {
        let mut paths: Vec<&String> = self.fs.keys().chain(self.baseline.keys()).collect();
        paths.sort();
        paths.dedup();

        let mut diffs = Vec::new();
        for path in paths {
            let before = self.baseline.get(path);
            let after = self.fs.get(path);
            let (mode, is_dir) = match (before, after) {
                (None, Some(is_dir)) => (DiffMode::Added, *is_dir),
                (Some(is_dir), None) => (DiffMode::Removed, *is_dir),
                (Some(before), Some(after)) if before == after => (DiffMode::Unchanged, *after),
                (Some(before), Some(after)) => (DiffMode::Modified, *before && *after),
                (None, None) => unreachable!("path came from one of the two maps"),
            };
            diffs.push(Diff {
                path: path.clone(),
                mode,
                is_dir,
            });
        }
        Ok(diffs)
    }

    fn commit_layer(&mut self) -> Result<Layer> {
        let mut entries: Vec<&String> = self.fs.keys().collect();
        entries.sort();
        let digest = entries
            .iter()
            .map(|path| path.as_str())
            .collect::<Vec<_>>()
            .join(":");
        Ok(Layer {
            digest: LayerDigest::new(digest),
        })
    }
}
