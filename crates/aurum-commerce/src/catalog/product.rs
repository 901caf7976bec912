//! Catalog product as supplied by the catalog service.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Units available for sale.
    pub stock: i64,
    /// Declared weight range in grams, formatted `"min-max"`.
    #[serde(default)]
    pub weight: String,
    /// Image URLs, first is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    /// Category name.
    #[serde(default)]
    pub category: Option<String>,
}

impl Product {
    /// Create a product with no weight range, images or category.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        stock: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            weight: String::new(),
            images: Vec::new(),
            category: None,
        }
    }

    /// Set the declared weight range, e.g. `"4.5-7"`.
    pub fn with_weight(mut self, weight: impl Into<String>) -> Self {
        self.weight = weight.into();
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Add an image URL.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }

    /// Check if the product can be bought at all.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Primary image URL.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Parse the declared weight range.
    pub fn weight_range(&self) -> Result<WeightRange, CommerceError> {
        self.weight.parse()
    }
}

/// Inclusive weight bounds in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

impl WeightRange {
    /// Create a range; `None` unless `0 <= min <= max` and both are finite.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        (min.is_finite() && max.is_finite() && 0.0 <= min && min <= max)
            .then_some(Self { min, max })
    }

    /// Any non-negative weight.
    pub fn unbounded() -> Self {
        Self {
            min: 0.0,
            max: f64::MAX,
        }
    }

    /// Bring `grams` into the range.
    pub fn clamp(&self, grams: f64) -> f64 {
        grams.clamp(self.min, self.max)
    }

    pub fn contains(&self, grams: f64) -> bool {
        (self.min..=self.max).contains(&grams)
    }
}

impl std::str::FromStr for WeightRange {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CommerceError::InvalidWeightRange(s.to_string());
        let (min, max) = s.split_once('-').ok_or_else(invalid)?;
        let min: f64 = min.trim().parse().map_err(|_| invalid())?;
        let max: f64 = max.trim().parse().map_err(|_| invalid())?;
        WeightRange::new(min, max).ok_or_else(invalid)
    }
}
