//! Session configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use stress_rules::{MeterConfig, MeterConfigError};
use thiserror::Error;

use crate::relief::ReliefItemConfig;
use crate::response::ResponseConfig;

/// Complete session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub meter: MeterConfig,
    #[serde(default)]
    pub responses: ResponseConfig,
    #[serde(default)]
    pub relief_items: Vec<ReliefItemConfig>,
}

impl SessionConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.meter.validate()?;
        self.responses.validate()?;

        let mut names = HashSet::new();
        for item in &self.relief_items {
            item.validate()?;
            if !names.insert(item.name.as_str()) {
                return Err(ConfigError::DuplicateItem(item.name.clone()));
            }
        }
        Ok(())
    }
}

/// Errors that can occur while loading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid meter config: {0}")]
    Meter(#[from] MeterConfigError),
    #[error("{field} must be a non-negative finite number, got {value}")]
    InvalidAmount { field: &'static str, value: f32 },
    #[error("relief item '{name}': {reason}")]
    InvalidItem { name: String, reason: String },
    #[error("duplicate relief item '{0}'")]
    DuplicateItem(String),
}

pub(crate) fn check_amount(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidAmount { field, value })
    }
}
