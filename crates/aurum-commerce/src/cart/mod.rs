//! Shopping cart module.
//!
//! Contains the cart aggregate and its line items.

mod cart;

pub use cart::{Cart, CartItem, Removal, MAX_QUANTITY_PER_ITEM};
