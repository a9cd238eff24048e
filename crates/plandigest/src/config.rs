//! Codec and normalizer configuration, loadable from TOML.
//!
//! Every setting has a default; an empty document yields [`Config::default`].

use serde::Deserialize;
use thiserror::Error as ThisError;

/// Default bound on one escaped field of the compact format.
pub const DEFAULT_MAX_FIELD_BYTES: usize = 64 * 1024;

/// Default bound on one encoded plan accepted by the decoder.
pub const DEFAULT_MAX_PLAN_BYTES: usize = 16 * 1024 * 1024;

/// Default bound on decoded tree depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

// Estimates beyond this precision carry no information and bloat log lines.
const MAX_EST_ROWS_PRECISION: usize = 6;

///
/// InListPolicy
///
/// How list-shaped literals (`IN (...)`, range lists, batch point-get keys)
/// contribute to the normalized form.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum InListPolicy {
    /// Lists of any length normalize identically: `in(test.t.a, ...)`.
    #[default]
    Collapse,

    /// List length is structural: `in(test.t.a, ?, ?, ?)`.
    PreserveArity,
}

///
/// Config
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    pub in_list: InListPolicy,
    pub max_field_bytes: usize,
    pub max_plan_bytes: usize,
    pub max_depth: usize,
    pub est_rows_precision: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            in_list: InListPolicy::default(),
            max_field_bytes: DEFAULT_MAX_FIELD_BYTES,
            max_plan_bytes: DEFAULT_MAX_PLAN_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
            est_rows_precision: 2,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_field_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max-field-bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_plan_bytes < self.max_field_bytes {
            return Err(ConfigError::Invalid {
                field: "max-plan-bytes",
                reason: format!(
                    "must be at least max-field-bytes ({})",
                    self.max_field_bytes
                ),
            });
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max-depth",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.est_rows_precision > MAX_EST_ROWS_PRECISION {
            return Err(ConfigError::Invalid {
                field: "est-rows-precision",
                reason: format!("must be at most {MAX_EST_ROWS_PRECISION}"),
            });
        }

        Ok(())
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

///
/// TESTS
///
