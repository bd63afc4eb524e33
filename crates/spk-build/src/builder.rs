// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use std::sync::Arc;

use spk_ident::{Ident, InclusionPolicy, PreReleasePolicy, RangeIdent, Request};
use spk_ident_build::Build;
use spk_option_map::OptionMap;
use spk_solver::Solver;
use spk_spec::Spec;
use spk_storage::Repository;
use spk_version_range::{EqualRange, VersionRange};

use crate::error::BuildError;
use crate::runtime::{Runtime, PREFIX};
use crate::validation::validate_build_changeset;
use crate::Result;

#[cfg(test)]
#[path = "./builder_test.rs"]
mod builder_test;

/// The artifact path a build's script and option dump are written under,
/// and the working directory the build script runs with.
fn data_path(ident: &Ident) -> String {
    format!(
        "{PREFIX}/spk/pkg/{}/{}/{}",
        ident.name,
        ident.version,
        ident.build.as_ref().map(Build::digest_str).unwrap_or_default(),
    )
}

/// A request that resolves to exactly this spec's SOURCE build.
fn source_request(spec: &Spec) -> Request {
    Request {
        pkg: RangeIdent {
            name: spec.pkg.name.clone(),
            version: VersionRange::Equal(EqualRange(spec.pkg.version.clone())),
            build: Some(Build::Source),
        },
        prerelease_policy: PreReleasePolicy::IncludeAll,
        inclusion_policy: InclusionPolicy::Always,
        pin: None,
    }
}

/// Drives two [`Solver`] runs and a [`Runtime`] to turn a [`Spec`] into a
/// published binary artifact.
///
/// A `Builder` resolves its source package against the local repository
/// only, then resolves a build environment against every repository it
/// was given, executes the build script, and validates and commits the
/// resulting changeset -- see [`Builder::build`] for the full sequence.
pub struct Builder {
    local_repo: Arc<dyn Repository>,
    repos: Vec<Arc<dyn Repository>>,
}

impl Builder {
    /// Construct a builder that publishes to `local_repo`, which is also
    /// consulted for the source resolve and included in the environment
    /// resolve.
    pub fn new(local_repo: Arc<dyn Repository>) -> Self {
        Self {
            repos: vec![local_repo.clone()],
            local_repo,
        }
    }

    /// Add another repository to consult when resolving the build
    /// environment.
    pub fn add_repository(&mut self, repo: Arc<dyn Repository>) {
        self.repos.push(repo);
    }

    /// Build `spec` against `given_options`, driving `runtime` to produce
    /// and publish a new binary artifact.
    ///
    /// Returns the published [`Ident`], carrying the build digest
    /// computed from the spec's fully resolved options.
    pub fn build(
        &self,
        mut spec: Spec,
        given_options: OptionMap,
        runtime: &mut dyn Runtime,
    ) -> Result<Ident> {
        let pkg_options = spec.resolve_all_options(&given_options)?;
        let built_ident = spec.with_build_from_options(&pkg_options);

        let source_solution = {
            let mut solver = Solver::new(pkg_options.clone());
            solver.add_repository(self.local_repo.clone());
            solver.add_request(source_request(&spec));
            solver.solve()?
        };
        runtime.configure(&source_solution)?;

        let mut env_solution = {
            let mut solver = Solver::new(pkg_options.clone());
            for repo in &self.repos {
                solver.add_repository(repo.clone());
            }
            for request in spec.get_build_requirements(&pkg_options)? {
                solver.add_request(request);
            }
            solver.solve()?
        };
        runtime.configure(&env_solution)?;
        runtime.set_editable(true);
        runtime.remount()?;

        env_solution.render_all_pins()?;
        spec.render_all_pins(|name| env_solution.resolved_version(name))?;

        let source_ident = spec.pkg.clone().into_build(Build::Source);
        let source_data_path = data_path(&source_ident);
        // Written under the digest build's own data path (not the SOURCE
        // one) so this metadata survives `reset`ing the source tree below
        // and lands in the committed layer at its §6 artifact location.
        let build_data_path = data_path(&built_ident);
        let script_path = format!("{build_data_path}/build.sh");
        let options_path = format!("{build_data_path}/options.json");
        runtime.write_file(&script_path, &spec.build_script)?;
        runtime.write_file(
            &options_path,
            &serde_json::to_string_pretty(&pkg_options)
                .map_err(|err| BuildError::new(err.to_string()))?,
        )?;

        let mut env = pkg_options.to_environment();
        env.insert("PREFIX".to_owned(), PREFIX.to_owned());
        let argv = runtime.build_shell_initialized_command(&script_path);
        let status = runtime.spawn_and_wait(&argv, &source_data_path, &env)?;
        if status != 0 {
            return Err(BuildError::new(format!(
                "build script exited with status {status}"
            ))
            .into());
        }

        runtime.reset(&source_data_path)?;
        runtime.remount()?;
        let diffs = runtime.diff()?;
        validate_build_changeset(&diffs, &build_data_path)?;

        let layer = runtime.commit_layer()?;
        spec.pkg = built_ident.clone();
        self.local_repo.publish_package(spec, layer.digest)?;

        Ok(built_ident)
    }
}
