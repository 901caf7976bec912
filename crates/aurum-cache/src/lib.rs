//! Type-safe key-value store for the Aurum storefront.
//!
//! Values are stored as JSON, either in process memory or as one file per
//! key inside a directory. The storefront keeps its durable cart here.
//!
//! # Example
//!
//! ```rust,ignore
//! use aurum_cache::{cache_key, Cache};
//!
//! let cache = Cache::open("./var/store")?;
//! let key = cache_key!("cart", "shopper-42");
//!
//! cache.set(&key, &cart)?;
//! let cart: Option<Cart> = cache.get(&key)?;
//! cache.delete(&key)?;
//! ```

mod error;
mod kv;

pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError};
}
