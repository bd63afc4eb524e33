// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use spk_version::Version;

/// Render a pin template against a concrete resolved version.
///
/// A pin template is a dotted sequence of components, each either a
/// literal digit or an `x`/`X` placeholder that is replaced by the
/// corresponding component of `version` (eg `x.x` against `3.11.2`
/// renders to `3.11`). This is the only pin grammar the core
/// understands; it is kept as a small function rather than a full AST
/// because the only structural operation ever performed on a pin is
/// this one substitution.
pub fn render_pin(template: &str, version: &Version) -> String {
    const PREFIXES: &[&str] = &["^", "~", ">=", "<=", ">", "<", "="];
    let prefix = PREFIXES
        .iter()
        .find(|p| template.starts_with(**p))
        .copied()
        .unwrap_or("");
    let rest = &template[prefix.len()..];
    let rendered = rest
        .split('.')
        .enumerate()
        .map(|(i, part)| {
            if part.eq_ignore_ascii_case("x") {
                version.parts.get(i).copied().unwrap_or(0).to_string()
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".");
    format!("{prefix}{rendered}")
}

#[cfg(test)]
mod pin_test {
    use super::*;

    #[test]
    fn test_render_pin_substitutes_placeholders() {
        let v: Version = "3.11.2".parse().unwrap();
        assert_eq!(render_pin("x.x", &v), "3.11");
        assert_eq!(render_pin("~x.x.x", &v), "~3.11.2");
    }

    #[test]
    fn test_render_pin_preserves_literals() {
        let v: Version = "3.11.2".parse().unwrap();
        assert_eq!(render_pin("1.x", &v), "1.11");
    }
}
