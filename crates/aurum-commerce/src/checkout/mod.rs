//! Checkout module.
//!
//! Turns a cart into the order payload handed to the payment provider.

mod order;

pub use order::{OrderDraft, OrderLine};
