//! Loyalty configuration
//!
//! TOML file with per-deployment settings. Tier rules themselves are not
//! configurable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::rules::DEFAULT_TIER;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "LOYALTY_CONFIG";

/// Loyalty configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyConfig {
    /// ISO 4217 code used when displaying amounts
    pub currency: String,
    /// Decimal places between minor and major units
    pub minor_unit_scale: u32,
    /// Color of the system tier when a program is seeded
    pub guest_color: String,
    /// User tiers allowed per tenant
    pub max_user_tiers: usize,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            minor_unit_scale: 2,
            guest_color: DEFAULT_TIER.color.into(),
            max_user_tiers: 20,
        }
    }
}

impl LoyaltyConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from file, falling back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Config not loaded, using defaults");
                Self::default()
            }
        }
    }

    /// Load from the file named by `LOYALTY_CONFIG`, or defaults
    pub fn from_env() -> Self {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_or_default(path),
            Err(_) => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid(format!("currency must be a 3-letter ISO code, got '{}'", self.currency)));
        }
        if self.minor_unit_scale > 4 {
            return Err(ConfigError::Invalid(format!("minor_unit_scale must be 0..=4, got {}", self.minor_unit_scale)));
        }
        if self.guest_color.trim().is_empty() {
            return Err(ConfigError::Invalid("guest_color cannot be empty".into()));
        }
        if self.max_user_tiers == 0 {
            return Err(ConfigError::Invalid("max_user_tiers must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
