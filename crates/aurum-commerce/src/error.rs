//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Product has no stock at all.
    #[error("Product out of stock: {product_id}")]
    OutOfStock { product_id: String },

    /// Requested quantity is more than the product's stock.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    ExceedsStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// The cart is still being restored from durable storage.
    #[error("Cart is still loading")]
    CartLoading,

    /// Nothing to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// A value that is not part of the option catalog for its axis.
    #[error("Unknown {axis} option: {value}")]
    UnknownOption { axis: &'static str, value: String },

    /// A configuration edit that the current state does not allow.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Groove list is full.
    #[error("At most {0} grooves are allowed")]
    TooManyGrooves(usize),

    /// Product weight is not a "min-max" gram range.
    #[error("Invalid weight range: {0:?}")]
    InvalidWeightRange(String),

    /// Durable store error.
    #[error("Store error: {0}")]
    StoreError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration file error.
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<aurum_cache::CacheError> for CommerceError {
    fn from(e: aurum_cache::CacheError) -> Self {
        match e {
            aurum_cache::CacheError::SerializeError(e) => {
                CommerceError::SerializationError(e.to_string())
            }
            other => CommerceError::StoreError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

impl CommerceError {
    /// Whether this is a stock rejection the shopper should be told about.
    pub fn is_stock_violation(&self) -> bool {
        matches!(
            self,
            CommerceError::OutOfStock { .. } | CommerceError::ExceedsStock { .. }
        )
    }
}
