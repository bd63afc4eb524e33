// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use super::*;

const META: &str = "/spfs/spk/pkg/my-pkg/1.0.0/abcdefgh";

fn diff(path: &str, mode: DiffMode, is_dir: bool) -> Diff {
    Diff {
        path: path.to_owned(),
        mode,
        is_dir,
    }
}

#[test]
fn test_empty_changeset_is_rejected() {
    let diffs = vec![diff("bin", DiffMode::Unchanged, true)];
    assert!(validate_build_changeset(&diffs, META).is_err());
}

#[test]
fn test_all_unchanged_is_rejected() {
    assert!(validate_build_changeset(&[], META).is_err());
}

#[test]
fn test_added_files_are_accepted() {
    let diffs = vec![
        diff("bin", DiffMode::Unchanged, true),
        diff("bin/my-tool", DiffMode::Added, false),
    ];
    assert!(validate_build_changeset(&diffs, META).is_ok());
}

#[test]
fn test_modified_directory_is_permitted() {
    let diffs = vec![
        diff("bin", DiffMode::Modified, true),
        diff("bin/my-tool", DiffMode::Added, false),
    ];
    assert!(validate_build_changeset(&diffs, META).is_ok());
}

#[test]
fn test_modified_file_is_rejected() {
    let diffs = vec![diff("bin/existing", DiffMode::Modified, false)];
    let err = validate_build_changeset(&diffs, META).unwrap_err();
    assert!(matches!(err, crate::Error::Build(_)));
}

#[test]
fn test_removed_file_is_rejected() {
    let diffs = vec![diff("bin/existing", DiffMode::Removed, false)];
    assert!(validate_build_changeset(&diffs, META).is_err());
}

#[test]
fn test_metadata_subtree_excluded_from_emptiness_check() {
    let diffs = vec![diff(&format!("{META}/build.sh"), DiffMode::Added, false)];
    let err = validate_build_changeset(&diffs, META).unwrap_err();
    assert!(matches!(err, crate::Error::Build(_)));
}

#[test]
fn test_metadata_subtree_does_not_block_real_changes() {
    let diffs = vec![
        diff(&format!("{META}/build.sh"), DiffMode::Added, false),
        diff(&format!("{META}/options.json"), DiffMode::Added, false),
        diff("bin/my-tool", DiffMode::Added, false),
    ];
    assert!(validate_build_changeset(&diffs, META).is_ok());
}
