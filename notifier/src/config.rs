//! Configuration file handling.
//!
//! The configuration is a TOML document with a single `[mailer]` table:
//!
//! ```toml
//! [mailer]
//! from = "alerts@example.com"
//! from_name = "Alerts"
//! api_key = "SG.xxxxx"
//! min_retry_delay_secs = 15
//! max_retry_delay_secs = 900
//! ```

use std::path::{Path, PathBuf};

use notifier_delivery::MailerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "SENDGRID_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required field is missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub mailer: MailerConfig,
}

impl Config {
    /// Read and parse `path`, apply the API key override from the
    /// environment, and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// required field is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = toml::from_str(&content)?;
        config.override_api_key(std::env::var(API_KEY_ENV).ok());
        config.validate()?;

        Ok(config)
    }

    /// Replace the API key with `api_key` when one is given and non-empty.
    pub fn override_api_key(&mut self, api_key: Option<String>) {
        if let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) {
            self.mailer.api_key = api_key;
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if the sender address or API key
    /// is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mailer.from.trim().is_empty() {
            return Err(ConfigError::MissingField("mailer.from"));
        }
        if self.mailer.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("mailer.api_key"));
        }

        Ok(())
    }
}
