//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use aurum_commerce::config::StorefrontConfig;
use aurum_commerce::notify::TracingSink;
use aurum_commerce::storefront::Storefront;

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Storefront configuration.
    pub config: StorefrontConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = match config_path {
            Some(path) => StorefrontConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path))?,
            // Try to find config in current directory or parent directories
            None => Self::find_config(&cwd).unwrap_or_default(),
        };

        Ok(Self { config, output, cwd })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<StorefrontConfig> {
        let config_names = ["aurum.toml", ".aurum.toml", "aurum.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = StorefrontConfig::load(&config_path) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Open the configured store and hydrate a storefront from it.
    pub async fn storefront(&self) -> Result<Storefront> {
        tracing::debug!(
            backend = ?self.config.store.backend,
            key = %self.config.store.cart_key,
            "Opening cart store"
        );
        let mut shop = Storefront::from_config(&self.config, Arc::new(TracingSink))
            .context("Failed to open cart store")?;
        shop.hydrate().await;
        Ok(shop)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}
