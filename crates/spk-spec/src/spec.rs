// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use serde::{Deserialize, Serialize};
use spk_ident::{Ident, Request};
use spk_ident_build::Build;
use spk_name::PkgNameBuf;
use spk_option_map::OptionMap;

use crate::pin::render_pin;
use crate::{Error, Opt, Result, SourceSpec};

/// The install-time shape of a package: what must be present alongside
/// it, and what it contributes wholesale on behalf of other packages.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallSpec {
    pub requirements: Vec<Request>,
    /// Identifiers of packages this build embeds and therefore also
    /// provides, without those packages needing their own resolution.
    pub embedded: Vec<Ident>,
}

/// A package specification: identity, build options, source inputs,
/// build script and install-time requirements.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    pub pkg: Ident,
    #[serde(default)]
    pub options: Vec<Opt>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    #[serde(default)]
    pub build_script: String,
    #[serde(default)]
    pub install: InstallSpec,
}

impl Spec {
    pub fn new(pkg: Ident) -> Self {
        Self {
            pkg,
            options: Vec::new(),
            sources: Vec::new(),
            build_script: String::new(),
            install: InstallSpec::default(),
        }
    }

    pub fn name(&self) -> &PkgNameBuf {
        &self.pkg.name
    }

    pub fn is_source(&self) -> bool {
        self.pkg.is_source()
    }

    /// Resolve the full set of build options for this spec, applying
    /// defaults for anything not present in `given` and validating that
    /// every value in `given` is acceptable.
    ///
    /// `PkgOpt` entries contribute their effective value (the given
    /// value, or their own default) to the returned map exactly like
    /// `VarOpt` entries do, since they are part of the build digest too.
    pub fn resolve_all_options(&self, given: &OptionMap) -> Result<OptionMap> {
        let mut resolved = OptionMap::default();
        for opt in &self.options {
            match opt {
                Opt::Var(v) => {
                    let name = v.var.clone();
                    let value = given
                        .get(&name)
                        .cloned()
                        .unwrap_or_else(|| v.get_default().to_owned());
                    let compat = v.validate(&value);
                    if !compat.is_ok() {
                        return Err(Error::String(format!(
                            "invalid option value for {name}: {compat}"
                        )));
                    }
                    resolved.insert(name, value);
                }
                Opt::Pkg(p) => {
                    let name = p.pkg.clone();
                    let value = given
                        .get(&name)
                        .cloned()
                        .unwrap_or_else(|| p.default.clone());
                    resolved.insert(name, value);
                }
            }
        }
        Ok(resolved)
    }

    /// The install requirements contributed by this spec's `PkgOpt`
    /// build options, given the resolved option values, in addition to
    /// the explicit `install.requirements`.
    pub fn get_build_requirements(&self, options: &OptionMap) -> Result<Vec<Request>> {
        let mut requirements = Vec::new();
        for opt in &self.options {
            if let Opt::Pkg(p) = opt {
                let value = options.get(&p.pkg).map(String::as_str);
                requirements.push(p.to_request(value)?);
            }
        }
        Ok(requirements)
    }

    /// Rewrite every pin template among this spec's install requirements
    /// in place, using `resolve` to look up the concrete version chosen
    /// for a dependency's name.
    ///
    /// Kept as a callback rather than taking a concrete `Solution` value
    /// so this crate need not depend on the solver's solution type; the
    /// solver/builder layer supplies the callback over its own solution.
    pub fn render_all_pins<F>(&mut self, resolve: F) -> Result<()>
    where
        F: Fn(&spk_name::PkgName) -> Option<spk_version::Version>,
    {
        for req in self.install.requirements.iter_mut() {
            let Some(template) = req.pin.clone() else {
                continue;
            };
            let version = resolve(req.name()).ok_or_else(|| {
                Error::String(format!(
                    "cannot render pin for '{}': not present in solution",
                    req.name()
                ))
            })?;
            let rendered = render_pin(&template, &version);
            let range = rendered.parse()?;
            req.pkg.version = range;
            req.pin = None;
        }
        Ok(())
    }

    /// Compute the build digest [`Ident`] for this spec given its fully
    /// resolved options, replacing any existing build.
    pub fn with_build_from_options(&self, options: &OptionMap) -> Ident {
        self.pkg.with_build(Some(Build::digest_from_options(options)))
    }
}

impl std::fmt::Display for Spec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pkg.fmt(f)
    }
}

#[cfg(test)]
mod spec_test {
    use spk_ident::parse_ident;

    use super::*;
    use crate::{PkgOpt, VarOpt};

    fn spec() -> Spec {
        let mut s = Spec::new(parse_ident("my-pkg/1.0.0").unwrap());
        s.options.push(Opt::Var(VarOpt {
            var: "debug".parse().unwrap(),
            default: "off".into(),
            choices: vec!["on".into(), "off".into()],
        }));
        s.options.push(Opt::Pkg(PkgOpt {
            pkg: "python".parse().unwrap(),
            default: ">=3".into(),
            prerelease_policy: Default::default(),
            inclusion_policy: Default::default(),
        }));
        s
    }

    #[test]
    fn test_resolve_all_options_applies_defaults() {
        let s = spec();
        let resolved = s.resolve_all_options(&OptionMap::default()).unwrap();
        assert_eq!(resolved.get(&"debug".parse::<spk_name::OptNameBuf>().unwrap()), Some(&"off".to_string()));
        assert_eq!(resolved.get(&"python".parse::<spk_name::OptNameBuf>().unwrap()), Some(&">=3".to_string()));
    }

    #[test]
    fn test_resolve_all_options_rejects_invalid_choice() {
        let s = spec();
        let mut given = OptionMap::default();
        given.insert("debug".parse().unwrap(), "maybe".into());
        assert!(s.resolve_all_options(&given).is_err());
    }

    #[test]
    fn test_get_build_requirements_from_pkg_opts() {
        let s = spec();
        let options = s.resolve_all_options(&OptionMap::default()).unwrap();
        let reqs = s.get_build_requirements(&options).unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].name().as_str(), "python");
    }

    #[test]
    fn test_render_all_pins() {
        let mut s = spec();
        s.install.requirements.push(Request {
            pkg: "python".parse().unwrap(),
            prerelease_policy: Default::default(),
            inclusion_policy: Default::default(),
            pin: Some("x.x".into()),
        });
        let python: spk_name::PkgNameBuf = "python".parse().unwrap();
        s.render_all_pins(|name| {
            (name == &*python).then(|| "3.11.2".parse().unwrap())
        })
        .unwrap();
        let rendered = &s.install.requirements[0];
        assert!(rendered.pin.is_none());
        assert!(rendered
            .pkg
            .is_version_applicable(&"3.11.0".parse().unwrap())
            .is_ok());
    }
}
