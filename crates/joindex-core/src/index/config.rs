use crate::error::{ConfigError, ErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};

///
/// IndexerConfig
///
/// Chain-shape options applied by the factory. The default keeps the
/// literal one-level-per-run chain.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexerConfig {
    /// Fuse a trailing equality run and comparison into one terminal level.
    pub fuse_equal_comparison: bool,

    /// On the right bridge, fuse two adjacent comparisons that bound a range
    /// into one range level. Exact only when the query supplies the same
    /// value to both columns (point-in-range joins).
    pub fuse_ranges: bool,
}

impl IndexerConfig {
    /// Every fusion enabled.
    #[must_use]
    pub const fn optimized() -> Self {
        Self {
            fuse_equal_comparison: true,
            fuse_ranges: true,
        }
    }

    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, InternalError> {
        toml::from_str(source).map_err(|err: toml::de::Error| {
            InternalError::config(
                ErrorOrigin::Config,
                ConfigError::Parse {
                    message: err.message().to_string(),
                },
            )
        })
    }
}

///
/// TESTS
///
