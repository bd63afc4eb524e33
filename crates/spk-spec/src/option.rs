// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use serde::{Deserialize, Serialize};
use spk_ident::{InclusionPolicy, PreReleasePolicy, RangeIdent, Request};
use spk_name::OptNameBuf;
use spk_version::Compatibility;
use spk_version_range::VersionRange;

use crate::Result;

/// A build-time string choice, eg `{var: debug, default: "off", choices: [on, off]}`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarOpt {
    pub var: OptNameBuf,
    #[serde(default)]
    pub default: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl VarOpt {
    /// The value to use when `given` has no entry for this option's name.
    pub fn get_default(&self) -> &str {
        &self.default
    }

    /// Validate a caller-supplied value against this option's `choices`.
    pub fn validate(&self, value: &str) -> Compatibility {
        if self.choices.is_empty() || self.choices.iter().any(|c| c == value) {
            Compatibility::Compatible
        } else {
            Compatibility::incompatible(format!(
                "invalid value '{value}' for {}, must be one of: {}",
                self.var,
                self.choices.join(", ")
            ))
        }
    }
}

/// A build-time dependency declaration, eg `{pkg: "python/3"}`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgOpt {
    pub pkg: OptNameBuf,
    #[serde(default)]
    pub default: String,
    #[serde(default)]
    pub prerelease_policy: PreReleasePolicy,
    #[serde(default)]
    pub inclusion_policy: InclusionPolicy,
}

impl PkgOpt {
    /// Build a [`Request`] for this dependency using `given_value` as the
    /// effective version range (falling back to this option's default).
    pub fn to_request(&self, given_value: Option<&str>) -> Result<Request> {
        let value = given_value
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.default);
        let range = if value.is_empty() {
            VersionRange::LowerBound(spk_version_range::LowerBound(Default::default()))
        } else {
            value.parse()?
        };
        let name: spk_name::PkgNameBuf = self.pkg.as_str().parse()?;
        Ok(Request {
            pkg: RangeIdent {
                name,
                version: range,
                build: None,
            },
            prerelease_policy: self.prerelease_policy,
            inclusion_policy: self.inclusion_policy,
            pin: None,
        })
    }
}

/// A build-option declaration: either a free-form string choice, or a
/// dependency that contributes a [`Request`] once a value is known.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Opt {
    Var(VarOpt),
    Pkg(PkgOpt),
}

impl Opt {
    /// The option name, namespaced for `PkgOpt` the way a dependency's
    /// options are addressed elsewhere (`<pkg>.<field>`).
    pub fn name(&self) -> &str {
        match self {
            Opt::Var(v) => v.var.as_str(),
            Opt::Pkg(p) => p.pkg.as_str(),
        }
    }

    pub fn is_pkg(&self) -> bool {
        matches!(self, Opt::Pkg(_))
    }
}

#[cfg(test)]
mod option_test {
    use super::*;

    #[test]
    fn test_var_opt_default_choice() {
        let opt = VarOpt {
            var: "debug".parse().unwrap(),
            default: "off".into(),
            choices: vec!["on".into(), "off".into()],
        };
        assert!(opt.validate("on").is_ok());
        assert!(!opt.validate("maybe").is_ok());
    }

    #[test]
    fn test_pkg_opt_to_request_uses_given_value() {
        let opt = PkgOpt {
            pkg: "python".parse().unwrap(),
            default: ">=1".into(),
            prerelease_policy: PreReleasePolicy::default(),
            inclusion_policy: InclusionPolicy::default(),
        };
        let req = opt.to_request(Some(">=3")).unwrap();
        assert_eq!(req.pkg.name.as_str(), "python");
        assert!(req.pkg.is_version_applicable(&"3.1".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_pkg_opt_to_request_falls_back_to_default() {
        let opt = PkgOpt {
            pkg: "python".parse().unwrap(),
            default: ">=3".into(),
            prerelease_policy: PreReleasePolicy::default(),
            inclusion_policy: InclusionPolicy::default(),
        };
        let req = opt.to_request(None).unwrap();
        assert!(req.pkg.is_version_applicable(&"3.1".parse().unwrap()).is_ok());
    }
}
