//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use passport_crypto::ConsentDomain;
use passport_types::PassportParams;

use crate::PassportError;

/// Configuration of a passport ledger.
///
/// Can be loaded from a TOML file via [`PassportConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportConfig {
    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Block at which the initial parameters take effect.
    #[serde(default)]
    pub genesis_block: u64,

    /// Domain bound into every offline consent signature.
    #[serde(default)]
    pub domain: ConsentDomain,

    /// Initial values of the checkpointed parameters.
    #[serde(default)]
    pub params: PassportParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PassportConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PassportError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PassportError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PassportError> {
        toml::from_str(s).map_err(|e| PassportError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, PassportError> {
        toml::to_string_pretty(self).map_err(|e| PassportError::Config(e.to_string()))
    }
}

impl Default for PassportConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            genesis_block: 0,
            domain: ConsentDomain::default(),
            params: PassportParams::default(),
        }
    }
}
