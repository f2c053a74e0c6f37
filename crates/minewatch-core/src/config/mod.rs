//! Per-user automation settings.
//!
//! Users are configured in a TOML roster; the orchestrator looks a user
//! up by chain address before deciding how much a reinforcement may
//! cost. A user with no entry, or an entry with no ceiling, gets no
//! ceiling enforced at this layer.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::BASE_UNITS_PER_TOKEN;

/// Settings for one automated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// Chain address the settings apply to.
    pub address: String,

    /// Maximum acceptable reinforcement price, in whole tokens.
    ///
    /// Absent means no ceiling is enforced by the orchestrator.
    #[serde(default)]
    pub max_reinforce_price: Option<u64>,
}

impl UserConfig {
    /// The ceiling converted to base units for strategy selection.
    #[must_use]
    pub fn max_reinforce_price_base_units(&self) -> Option<u128> {
        self.max_reinforce_price
            .map(|tokens| u128::from(tokens) * BASE_UNITS_PER_TOKEN)
    }
}

/// The configured user roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersConfig {
    /// Configured users.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl UsersConfig {
    /// Loads the roster from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses the roster from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, an address is empty, or
    /// the same address appears twice.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for user in &self.users {
            if user.address.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "user address must not be empty".to_string(),
                ));
            }
            if !seen.insert(user.address.to_ascii_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate user address: {}",
                    user.address
                )));
            }
        }
        Ok(())
    }

    /// Looks up a user's settings by address, case-insensitively.
    ///
    /// Chain addresses are hex strings whose letter casing carries no
    /// identity.
    #[must_use]
    pub fn user(&self, address: &str) -> Option<&UserConfig> {
        self.users
            .iter()
            .find(|user| user.address.eq_ignore_ascii_case(address))
    }
}

/// Configuration error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// I/O error reading the configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}
