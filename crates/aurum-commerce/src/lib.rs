//! Ring configurator and cart core for the Aurum jewelry storefront.
//!
//! - **Catalog**: products as supplied by the catalog service
//! - **Configurator**: option catalogs, the ring build model, step gating
//! - **Cart**: line items, stock checks, derived totals
//! - **Storefront**: the service that binds the configurator to one cart
//!   line and persists the cart
//! - **Checkout**: the order payload handed to payment
//!
//! # Example
//!
//! ```rust,ignore
//! use aurum_commerce::prelude::*;
//! use std::sync::Arc;
//!
//! let mut shop = Storefront::new(
//!     Arc::new(KvCartStore::in_memory()),
//!     Arc::new(TracingSink),
//! );
//! shop.hydrate().await;
//!
//! let band = Product::new("band-01", "Wedding band", Money::new(89000, Currency::USD), 3)
//!     .with_weight("4-9");
//! let line = shop.add_to_cart(&band, 1).await?;
//! shop.select_cart_item(Some(&line)).await?;
//! shop.configure(ConfigUpdate::Profile(Some(Profile::Flat))).await?;
//!
//! println!("Total: {}", shop.cart().total());
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod configurator;
pub mod notify;
pub mod storefront;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Product, WeightRange};

    // Configurator
    pub use crate::configurator::options::*;
    pub use crate::configurator::{
        ConfigUpdate, ConfiguratorState, ConfiguratorStep, EdgeSide, StepTransition,
        ValidationReason,
    };

    // Cart
    pub use crate::cart::{Cart, CartItem};

    // Checkout
    pub use crate::checkout::{OrderDraft, OrderLine};

    // Service
    pub use crate::config::StorefrontConfig;
    pub use crate::notify::{Notice, NotificationSink, RecordingSink, TracingSink};
    pub use crate::storefront::{CartStore, KvCartStore, Storefront};
}
