// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use crate::error::BuildError;
use crate::runtime::{Diff, DiffMode};
use crate::Result;

#[cfg(test)]
#[path = "./validation_test.rs"]
mod validation_test;

/// Validate the changeset a build produced.
///
/// `unchanged` entries are dropped first, along with anything under
/// `metadata_path` -- the build script and option dump the builder writes
/// for provenance, which must not themselves count toward "the build
/// produced files" or be held to the added-only rule below. What remains
/// must be non-empty, and every entry must be [`DiffMode::Added`] -- the
/// single exception is a [`DiffMode::Modified`] directory, permitted
/// because a directory that already existed under a parent package's
/// install can legitimately gain a mode change without this build having
/// added or removed anything inside it.
pub fn validate_build_changeset(diffs: &[Diff], metadata_path: &str) -> Result<()> {
    let changed: Vec<&Diff> = diffs
        .iter()
        .filter(|diff| !matches!(diff.mode, DiffMode::Unchanged))
        .filter(|diff| !diff.path.starts_with(metadata_path))
        .collect();

    if changed.is_empty() {
        return Err(BuildError::new("build produced no new files").into());
    }

    for diff in changed {
        match diff.mode {
            DiffMode::Added => continue,
            DiffMode::Modified if diff.is_dir => continue,
            DiffMode::Modified => {
                return Err(BuildError::new(format!(
                    "build modified an existing file: {}",
                    diff.path
                ))
                .into())
            }
            DiffMode::Removed => {
                return Err(BuildError::new(format!(
                    "build removed an existing file: {}",
                    diff.path
                ))
                .into())
            }
            DiffMode::Unchanged => unreachable!("filtered out above"),
        }
    }
    Ok(())
}
