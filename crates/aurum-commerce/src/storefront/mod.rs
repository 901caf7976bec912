//! Storefront service and its durable cart store.

mod service;
mod store;

pub use service::Storefront;
pub use store::{CartStore, KvCartStore};
