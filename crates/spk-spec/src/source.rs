// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use serde::{Deserialize, Serialize};

/// A single source input for a package's build, collected into the
/// source package's data path before the build script runs.
///
/// External ecosystem importers and network source fetchers (git clones,
/// tarball downloads) are collaborators outside the core; this models only
/// the subset needed by the build pipeline to know what to copy and where.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSpec {
    Local(LocalSource),
}

impl SourceSpec {
    /// The subdirectory under the source data path that this source
    /// should be collected into, if any.
    pub fn subdir(&self) -> Option<&str> {
        match self {
            SourceSpec::Local(l) => l.subdir.as_deref(),
        }
    }
}

/// A source rooted in the local filesystem relative to wherever the
/// spec file itself lives.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSource {
    /// Path, relative to the spec file, of the files to collect. Defaults
    /// to the directory containing the spec file.
    #[serde(default)]
    pub path: Option<std::path::PathBuf>,
    #[serde(default)]
    pub subdir: Option<String>,
    /// Glob-style exclude patterns applied while copying.
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[cfg(test)]
mod source_test {
    use super::*;

    #[test]
    fn test_subdir() {
        let s = SourceSpec::Local(LocalSource {
            path: None,
            subdir: Some("vendor".into()),
            exclude: Vec::new(),
        });
        assert_eq!(s.subdir(), Some("vendor"));
    }
}
