//! Storefront configuration.
//!
//! Loaded from TOML or JSON (picked by file extension). Every section has
//! defaults so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use aurum_cache::Cache;
use serde::{Deserialize, Serialize};

use crate::cart::MAX_QUANTITY_PER_ITEM;
use crate::error::CommerceError;
use crate::money::Currency;

/// Storefront configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Currency of the cart total.
    #[serde(default)]
    pub currency: Currency,

    /// Ceiling on any single line's quantity, on top of stock.
    #[serde(default = "default_max_quantity")]
    pub max_quantity_per_item: i64,

    /// Durable cart store.
    #[serde(default)]
    pub store: StoreConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            max_quantity_per_item: default_max_quantity(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_max_quantity() -> i64 {
    MAX_QUANTITY_PER_ITEM
}

impl StorefrontConfig {
    /// Load config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommerceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CommerceError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = if is_json(path) {
            serde_json::from_str(&content).map_err(|e| {
                CommerceError::ConfigError(format!(
                    "Failed to parse JSON {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            toml::from_str(&content).map_err(|e| {
                CommerceError::ConfigError(format!(
                    "Failed to parse TOML {}: {}",
                    path.display(),
                    e
                ))
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CommerceError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self).map_err(|e| CommerceError::ConfigError(e.to_string()))?
        };

        std::fs::write(path, content).map_err(|e| {
            CommerceError::ConfigError(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Reject values no storefront can run with.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.max_quantity_per_item < 1 {
            return Err(CommerceError::ConfigError(format!(
                "max_quantity_per_item must be at least 1, got {}",
                self.max_quantity_per_item
            )));
        }
        if self.store.cart_key.is_empty() {
            return Err(CommerceError::ConfigError("store.cart_key is empty".into()));
        }
        if self.store.backend == StoreBackend::File && self.store.path.is_none() {
            return Err(CommerceError::ConfigError(
                "store.path is required for the file backend".into(),
            ));
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Where carts are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory; lost on exit.
    #[default]
    Memory,
    /// One JSON file per key in a directory.
    File,
}

/// Durable cart store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory for the file backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Key the cart is stored under.
    #[serde(default = "default_cart_key")]
    pub cart_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: None,
            cart_key: default_cart_key(),
        }
    }
}

fn default_cart_key() -> String {
    "cart".to_string()
}

impl StoreConfig {
    /// Open the configured backend.
    pub fn open(&self) -> Result<Cache, CommerceError> {
        match (self.backend, &self.path) {
            (StoreBackend::Memory, _) => Ok(Cache::in_memory()),
            (StoreBackend::File, Some(path)) => Ok(Cache::open(path)?),
            (StoreBackend::File, None) => Err(CommerceError::ConfigError(
                "store.path is required for the file backend".into(),
            )),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
