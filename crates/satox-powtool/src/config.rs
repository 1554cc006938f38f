//! Tool configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use satox_chain::ValidationConfig;
use satox_pow::store::DEFAULT_RETAIN_EPOCHS;
use satox_pow::PowParams;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SATOX_CONFIG";

/// Config file used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "satox.toml";

/// Complete tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
    /// PoW settings.
    #[serde(default)]
    pub pow: PowConfig,
    /// Block validation settings.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Which parameter set to hash with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Regtest,
}

/// PoW configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowConfig {
    #[serde(default)]
    pub network: Network,
    /// Epochs kept resident by the epoch store.
    #[serde(default = "default_retain_epochs")]
    pub retain_epochs: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_retain_epochs() -> usize {
    DEFAULT_RETAIN_EPOCHS
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            retain_epochs: default_retain_epochs(),
        }
    }
}

impl PowConfig {
    /// Consensus parameters for the configured network.
    pub fn params(&self) -> PowParams {
        match self.network {
            Network::Mainnet => PowParams::MAINNET,
            Network::Regtest => PowParams::REGTEST,
        }
    }
}

impl ToolConfig {
    /// Load configuration from `$SATOX_CONFIG` or `./satox.toml`.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn config_path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}
