//! Durable cart storage.

use async_trait::async_trait;
use aurum_cache::{cache_key, Cache};

use crate::cart::Cart;
use crate::error::CommerceError;

/// Where the cart survives restarts.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load the stored cart. `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Cart>, CommerceError>;

    /// Replace the stored cart.
    async fn save(&self, cart: &Cart) -> Result<(), CommerceError>;
}

/// Cart store over an `aurum_cache::Cache`, holding the cart under one key.
#[derive(Debug, Clone)]
pub struct KvCartStore {
    cache: Cache,
    key: String,
}

impl KvCartStore {
    pub fn new(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    /// A store in process memory under the key `cart`.
    pub fn in_memory() -> Self {
        Self::new(Cache::in_memory(), "cart")
    }

    /// One cart per shopper in a shared cache.
    pub fn for_shopper(cache: Cache, shopper_id: &str) -> Self {
        Self::new(cache, cache_key!("cart", shopper_id))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }
}

#[async_trait]
impl CartStore for KvCartStore {
    async fn load(&self) -> Result<Option<Cart>, CommerceError> {
        Ok(self.cache.get(&self.key)?)
    }

    async fn save(&self, cart: &Cart) -> Result<(), CommerceError> {
        self.cache.set(&self.key, cart)?;
        Ok(())
    }
}
