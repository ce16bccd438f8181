//! Configuration for the ticket key rotator

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use ticket_keys_logging::LogFormat;

/// Prefix of every environment variable read by [`RotatorConfig::from_env`]
pub const ENV_PREFIX: &str = "TICKET_KEYS";

/// Rotator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RotatorConfig {
    /// Keys kept per TLS context, active one included
    pub max_keys: usize,
    /// Hex-encoded 48-byte encryption key
    pub key_file: PathBuf,
    /// Hex-encoded 48-byte extra decryption-only key
    pub decryption_key_file: Option<PathBuf>,
    pub check_interval_secs: u64,
    /// Comma-separated TLS context ids
    pub contexts: String,
    pub log_level: String,
    pub log_format: String,
}

impl RotatorConfig {
    /// Load configuration from `TICKET_KEYS_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let source = Self::defaults()?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Self::from_config(source)
    }

    /// Builder pre-populated with defaults
    pub fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("max_keys", 3)?
            .set_default("check_interval_secs", 300)?
            .set_default("log_level", "info")?
            .set_default("log_format", "console")
    }

    /// Deserialize and validate an already built source
    pub fn from_config(source: Config) -> Result<Self, ConfigError> {
        let config: Self = source.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_keys < 1 {
            return Err(ConfigError::Message("max_keys must be at least 1".to_string()));
        }
        if self.check_interval_secs < 1 {
            return Err(ConfigError::Message(
                "check_interval_secs must be at least 1".to_string(),
            ));
        }
        self.parse_log_format()?;
        if self.context_ids()?.is_empty() {
            return Err(ConfigError::Message("no TLS contexts configured".to_string()));
        }
        Ok(())
    }

    /// Parsed context ids, in configured order
    pub fn context_ids(&self) -> Result<Vec<u64>, ConfigError> {
        self.contexts
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|e| ConfigError::Message(format!("invalid context id {:?}: {}", s, e)))
            })
            .collect()
    }

    fn parse_log_format(&self) -> Result<LogFormat, ConfigError> {
        self.log_format.parse().map_err(ConfigError::Message)
    }

    /// Log output format; validated when the config is loaded
    pub fn log_format(&self) -> LogFormat {
        self.parse_log_format().unwrap_or_default()
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        if self.log_level.is_empty() {
            "info"
        } else {
            &self.log_level
        }
    }
}
