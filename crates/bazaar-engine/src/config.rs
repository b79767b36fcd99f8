//! Application configuration.

use crate::error::{AppError, AppResult};
use bazaar_guard::GuardConfig;
use bazaar_pricing::PricingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// One catalog entry the engine prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemConfig {
    /// Item identifier, case-insensitive.
    pub id: String,
    /// Anchor price in whole coins.
    pub base_price: i64,
    /// Absolute floor; derived from the price band when omitted.
    #[serde(default)]
    pub min_price: Option<i64>,
    /// Absolute ceiling; derived from the price band when omitted.
    #[serde(default)]
    pub max_price: Option<i64>,
}

/// Snapshot persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Directory for price snapshots.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Items to register at startup.
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

impl AppConfig {
    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load() -> Self {
        let config_path =
            std::env::var("BAZAAR_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            warn!(path = %config_path, "Config file not found, using defaults");
            Self::default()
        }
    }

    /// Load from a specific file.
    ///
    /// A config problem is never fatal: an unreadable or unparsable file
    /// yields full defaults, an invalid section yields that section's
    /// defaults, each logged at warning level.
    pub fn from_file(path: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path, %e, "Failed to read config, using defaults");
                return Self::default();
            }
        };

        match toml::from_str::<Self>(&content) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                warn!(path = %path, %e, "Failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Replace invalid sections with their defaults, dropping bad items.
    fn sanitized(mut self) -> Self {
        if let Err(e) = self.pricing.validate() {
            warn!(%e, "Invalid [pricing] section, using defaults");
            self.pricing = PricingConfig::default();
        }
        if let Err(e) = self.guard.validate() {
            warn!(%e, "Invalid [guard] section, using defaults");
            self.guard = GuardConfig::default();
        }
        self.items.retain(|item| {
            let valid = !item.id.trim().is_empty() && item.base_price >= 1;
            if !valid {
                warn!(item = %item.id, base = item.base_price, "Dropping invalid item entry");
            }
            valid
        });
        self
    }

    /// Validate all sections.
    pub fn validate(&self) -> AppResult<()> {
        self.pricing.validate()?;
        self.guard.validate()?;
        for item in &self.items {
            if item.id.trim().is_empty() {
                return Err(AppError::Config("item id must not be empty".to_string()));
            }
            if item.base_price < 1 {
                return Err(AppError::Config(format!(
                    "item '{}': base_price ({}) must be at least 1",
                    item.id, item.base_price
                )));
            }
        }
        Ok(())
    }
}
