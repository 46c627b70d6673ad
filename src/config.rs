//! Application configuration.
//!
//! Supports YAML file and environment variable overrides.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "CHORUS_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "CHORUS";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "CHORUS_LOG";

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stream monetization rules.
    pub monetization: MonetizationConfig,
}

/// Stream monetization configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonetizationConfig {
    /// Payout per started minute of a monetizable stream.
    pub rate_per_minute: Decimal,
    /// Streams must be strictly longer than this many seconds to earn.
    pub threshold_secs: u64,
}

impl Default for MonetizationConfig {
    fn default() -> Self {
        Self {
            rate_per_minute: dec!(0.004),
            threshold_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CHORUS_CONFIG` environment variable (if set)
    /// 4. Environment variables with `CHORUS` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
