// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use spk_ident::parse_ident;
use spk_storage::MemRepository;

use super::*;
use crate::InMemoryRuntime;

fn publish_source(repo: &MemRepository, ident: &str) {
    let recipe_ident = parse_ident(ident).unwrap();
    let spec = Spec::new(recipe_ident.into_build(Build::Source));
    repo.publish_package(spec, spk_storage::LayerDigest::new("source-layer"))
        .unwrap();
}

fn unbuilt_spec(ident: &str) -> Spec {
    Spec::new(parse_ident(ident).unwrap())
}

#[test]
fn test_build_publishes_a_digest_build() {
    let repo = Arc::new(MemRepository::default());
    publish_source(&repo, "my-pkg/1.0.0");

    let builder = Builder::new(repo.clone());
    let mut runtime = InMemoryRuntime::new().with_script(Box::new(|fs, _env| {
        fs.insert(format!("{PREFIX}/bin/my-tool"), false);
        0
    }));

    let published = builder
        .build(unbuilt_spec("my-pkg/1.0.0"), OptionMap::default(), &mut runtime)
        .unwrap();

    assert!(published.build.as_ref().unwrap().is_digest());
    assert!(runtime.is_editable());
    let built = repo
        .read_spec(&published)
        .expect("published build should be on record");
    assert_eq!(built.pkg, published);
}

#[test]
fn test_build_script_failure_aborts() {
    let repo = Arc::new(MemRepository::default());
    publish_source(&repo, "my-pkg/1.0.0");

    let builder = Builder::new(repo.clone());
    let mut runtime = InMemoryRuntime::new().with_script(Box::new(|_fs, _env| 1));

    let err = builder
        .build(unbuilt_spec("my-pkg/1.0.0"), OptionMap::default(), &mut runtime)
        .unwrap_err();
    assert!(matches!(err, Error::Build(_)));
}

#[test]
fn test_build_producing_no_files_is_rejected() {
    let repo = Arc::new(MemRepository::default());
    publish_source(&repo, "my-pkg/1.0.0");

    let builder = Builder::new(repo.clone());
    // No script hook installed: spawn_and_wait succeeds but writes nothing
    // under PREFIX, so the only changes are the build script/options dump
    // under the digest build's own metadata path, which the changeset
    // validation excludes from the "produced files" check.
    let mut runtime = InMemoryRuntime::new();

    let err = builder
        .build(unbuilt_spec("my-pkg/1.0.0"), OptionMap::default(), &mut runtime)
        .unwrap_err();
    assert!(matches!(err, Error::Build(_)));
}

#[test]
fn test_build_modifying_an_existing_file_is_rejected() {
    let repo = Arc::new(MemRepository::default());
    publish_source(&repo, "my-pkg/1.0.0");

    let builder = Builder::new(repo.clone());
    let existing = format!("{PREFIX}/bin/already-there");
    let mut runtime = InMemoryRuntime::new()
        .seed(existing.clone(), false)
        .with_script(Box::new(move |fs, _env| {
            // flip it from a file to a directory: still a change, and
            // not the permitted directory-preserving case since it
            // wasn't a directory to begin with.
            fs.insert(existing.clone(), true);
            0
        }));

    let err = builder
        .build(unbuilt_spec("my-pkg/1.0.0"), OptionMap::default(), &mut runtime)
        .unwrap_err();
    assert!(matches!(err, Error::Build(_)));
}

#[test]
fn test_missing_source_build_is_unresolved() {
    let repo = Arc::new(MemRepository::default());
    let builder = Builder::new(repo);
    let mut runtime = InMemoryRuntime::new();

    let err = builder
        .build(unbuilt_spec("my-pkg/1.0.0"), OptionMap::default(), &mut runtime)
        .unwrap_err();
    assert!(matches!(err, Error::SpkSolverError(_)));
}
