use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine settings. Every field has a default, so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Significant digits of real results
    pub significant_digits: usize,
    /// Fixed decimals of financial results
    pub currency_decimals: usize,
    /// Entries returned by a history request without an explicit limit
    pub history_limit: usize,
    /// Append failed calculations to the history too
    pub record_failures: bool,
    /// Session used when a request does not name one
    pub default_session: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            significant_digits: 10,
            currency_decimals: 2,
            history_limit: 50,
            record_failures: true,
            default_session: "default".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(text).context("Parse engine config")?;
        if cfg.significant_digits == 0 || cfg.significant_digits > 17 {
            anyhow::bail!(
                "significant_digits must be between 1 and 17, got {}",
                cfg.significant_digits
            );
        }
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Read config file {}", path.display()))?;
        EngineConfig::from_toml_str(&text).with_context(|| format!("Load config {}", path.display()))
    }
}
