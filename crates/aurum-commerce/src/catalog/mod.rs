//! Product catalog module.
//!
//! Products come from the external catalog service; the storefront needs
//! only identity, price, stock and the declared weight range.

mod product;

pub use product::{Product, WeightRange};
