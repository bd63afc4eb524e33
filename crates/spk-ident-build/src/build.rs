// Copyright (c) Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use spk_option_map::OptionMap;

use crate::{Error, Result};

/// A sentinel build digest is still 8 characters, keeping every `Build`
/// the same width on disk regardless of variant.
const SOURCE_DIGEST: spk_option_map::Digest = ['S', 'R', 'C', '-', '-', '-', '-', '-'];
const EMBEDDED_DIGEST: spk_option_map::Digest = ['E', 'M', 'B', '-', '-', '-', '-', '-'];

/// Identifies which artifact a package [`crate::Ident`] refers to: an
/// unbuilt source package, a package contributed wholesale by another
/// package's build, or a binary built from a specific option assignment.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Build {
    Source,
    Embedded,
    Digest(spk_option_map::Digest),
}

impl Build {
    /// The build for a package's resolved option assignment.
    pub fn digest_from_options(options: &OptionMap) -> Self {
        Build::Digest(options.digest())
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source)
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded)
    }

    pub fn is_digest(&self) -> bool {
        matches!(self, Self::Digest(_))
    }

    /// The fixed-width digest bytes for this build, using a sentinel
    /// for the non-digest variants so every build has the same width
    /// wherever it appears in an artifact path.
    pub fn digest(&self) -> spk_option_map::Digest {
        match self {
            Self::Source => SOURCE_DIGEST,
            Self::Embedded => EMBEDDED_DIGEST,
            Self::Digest(d) => *d,
        }
    }

    /// The fixed-width digest as a plain string, the textual form used
    /// in an [`crate::Ident`] and in build artifact paths.
    pub fn digest_str(&self) -> String {
        self.digest().iter().collect()
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest_str())
    }
}

impl FromStr for Build {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self> {
        match source {
            _ if source.chars().eq(SOURCE_DIGEST.iter().copied()) => Ok(Self::Source),
            _ if source.chars().eq(EMBEDDED_DIGEST.iter().copied()) => Ok(Self::Embedded),
            _ => {
                let chars: Vec<char> = source.chars().collect();
                let digest: spk_option_map::Digest = chars.try_into().map_err(|_| {
                    Error::InvalidBuildError(
                        source.to_owned(),
                        format!("build digest must be exactly {} characters", spk_option_map::DIGEST_SIZE),
                    )
                })?;
                Ok(Self::Digest(digest))
            }
        }
    }
}

impl Serialize for Build {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.digest_str())
    }
}

impl<'de> Deserialize<'de> for Build {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod build_test {
    use super::*;

    #[test]
    fn test_source_round_trip() {
        let b = Build::Source;
        let s = b.to_string();
        assert_eq!(s.parse::<Build>().unwrap(), b);
    }

    #[test]
    fn test_embedded_round_trip() {
        let b = Build::Embedded;
        let s = b.to_string();
        assert_eq!(s.parse::<Build>().unwrap(), b);
    }

    #[test]
    fn test_digest_round_trip() {
        let opts = spk_option_map::OptionMap::default();
        let b = Build::digest_from_options(&opts);
        let s = b.to_string();
        assert_eq!(s.parse::<Build>().unwrap(), b);
    }

    #[test]
    fn test_equality_by_variant_and_bytes() {
        let opts_a = spk_option_map::OptionMap::default();
        let mut opts_b = spk_option_map::OptionMap::default();
        opts_b.insert("debug".try_into().unwrap(), "on".into());
        assert_ne!(
            Build::digest_from_options(&opts_a),
            Build::digest_from_options(&opts_b)
        );
        assert_ne!(Build::Source, Build::Embedded);
    }
}
