//! Cart and line item types.

use crate::catalog::Product;
use crate::configurator::ConfiguratorState;
use crate::error::CommerceError;
use crate::ids::{CartId, LineItemId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// One product entry in the cart, optionally carrying a ring build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Unique line item identifier.
    pub id: LineItemId,
    /// Product snapshot taken when the item was added.
    pub product: Product,
    /// Ring build for this item, owned by value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ConfiguratorState>,
    /// Quantity.
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

impl CartItem {
    /// A fresh line with no configuration attached.
    pub fn new(product: Product, quantity: i64) -> Self {
        Self {
            id: LineItemId::generate(),
            product,
            configuration: None,
            quantity,
        }
    }

    /// Price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.product
            .price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// Result of removing a product's lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    /// Lines that were removed.
    pub removed: Vec<LineItemId>,
    /// The removed lines included the one being configured.
    pub selection_cleared: bool,
}

/// A shopping cart.
///
/// `total` is derived and recomputed after every mutation. Each mutation
/// works on a copy of the item list and commits only when the new total
/// computes, so a rejected mutation leaves the cart unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Items in the cart.
    items: Vec<CartItem>,
    /// Sum of price times quantity over all items.
    total: Money,
    /// Line currently being configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_item_id: Option<LineItemId>,
    /// Cart currency.
    pub currency: Currency,
    /// Unix timestamp of last update.
    pub updated_at: i64,
    #[serde(skip, default = "default_quantity_limit")]
    quantity_limit: i64,
}

fn default_quantity_limit() -> i64 {
    MAX_QUANTITY_PER_ITEM
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: Currency) -> Self {
        Self {
            id: CartId::generate(),
            items: Vec::new(),
            total: Money::zero(currency),
            selected_item_id: None,
            currency,
            updated_at: current_timestamp(),
            quantity_limit: MAX_QUANTITY_PER_ITEM,
        }
    }

    /// Cap every line's quantity at `limit` on top of stock checks.
    pub fn with_quantity_limit(mut self, limit: i64) -> Self {
        self.quantity_limit = limit;
        self
    }

    pub fn set_quantity_limit(&mut self, limit: i64) {
        self.quantity_limit = limit;
    }

    /// Add a product, merging into an existing line for the same product.
    ///
    /// Rejected when the product has no stock, when the resulting line
    /// quantity would exceed stock, or when the quantity is not positive.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
    ) -> Result<LineItemId, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if product.price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: product.price.currency.code().to_string(),
            });
        }
        if product.stock <= 0 {
            return Err(CommerceError::OutOfStock {
                product_id: product.id.to_string(),
            });
        }

        let mut items = self.items.clone();
        let id = match items.iter_mut().find(|i| i.product.id == product.id) {
            Some(existing) => {
                let requested = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CommerceError::Overflow)?;
                self.check_quantity(product, requested)?;
                existing.quantity = requested;
                existing.id.clone()
            }
            None => {
                self.check_quantity(product, quantity)?;
                let item = CartItem::new(product.clone(), quantity);
                let id = item.id.clone();
                items.push(item);
                id
            }
        };
        self.commit(items)?;
        Ok(id)
    }

    /// Replace the quantity on the line for `product_id`.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let mut items = self.items.clone();
        let item = items
            .iter_mut()
            .find(|i| &i.product.id == product_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(product_id.to_string()))?;
        self.check_quantity(&item.product, quantity)?;
        item.quantity = quantity;
        self.commit(items)
    }

    /// Remove every line for `product_id`, clearing the selection if it
    /// pointed at one of them.
    pub fn remove_product(&mut self, product_id: &ProductId) -> Result<Removal, CommerceError> {
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .items
            .iter()
            .cloned()
            .partition(|i| &i.product.id == product_id);
        if removed.is_empty() {
            return Err(CommerceError::ItemNotInCart(product_id.to_string()));
        }

        let removed: Vec<LineItemId> = removed.into_iter().map(|i| i.id).collect();
        self.commit(kept)?;
        let selection_cleared = self
            .selected_item_id
            .as_ref()
            .is_some_and(|selected| removed.contains(selected));
        if selection_cleared {
            self.selected_item_id = None;
        }
        Ok(Removal {
            removed,
            selection_cleared,
        })
    }

    /// Clear all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected_item_id = None;
        self.total = Money::zero(self.currency);
        self.updated_at = current_timestamp();
    }

    /// Toggle the configured line.
    ///
    /// `Some(id)` of an unselected line selects it; `Some(id)` of the
    /// selected line and `None` both deselect. Returns the new selection.
    pub fn toggle_selection(
        &mut self,
        id: Option<&LineItemId>,
    ) -> Result<Option<LineItemId>, CommerceError> {
        let next = match id {
            None => None,
            Some(id) if self.selected_item_id.as_ref() == Some(id) => None,
            Some(id) => {
                if self.get_item(id).is_none() {
                    return Err(CommerceError::ItemNotInCart(id.to_string()));
                }
                Some(id.clone())
            }
        };
        self.selected_item_id = next.clone();
        self.updated_at = current_timestamp();
        Ok(next)
    }

    /// Store `configuration` on `id` if, and only if, it is the selected line.
    ///
    /// Returns whether anything was written.
    pub fn update_configuration(
        &mut self,
        id: &LineItemId,
        configuration: &ConfiguratorState,
    ) -> bool {
        if self.selected_item_id.as_ref() != Some(id) {
            return false;
        }
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(item) => {
                item.configuration = Some(configuration.clone());
                self.updated_at = current_timestamp();
                true
            }
            None => false,
        }
    }

    /// Drop a selection that points at no line. Returns whether it did.
    pub fn heal_selection(&mut self) -> bool {
        match &self.selected_item_id {
            Some(id) if self.get_item(id).is_none() => {
                self.selected_item_id = None;
                true
            }
            _ => false,
        }
    }

    /// Recompute the derived total, e.g. after loading from storage.
    pub fn recompute_total(&mut self) -> Result<(), CommerceError> {
        self.total = compute_total(&self.items, self.currency)?;
        Ok(())
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn selected_item_id(&self) -> Option<&LineItemId> {
        self.selected_item_id.as_ref()
    }

    pub fn selected_item(&self) -> Option<&CartItem> {
        self.selected_item_id.as_ref().and_then(|id| self.get_item(id))
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by ID.
    pub fn get_item(&self, id: &LineItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Get the line for a product.
    pub fn get_item_by_product(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product.id == product_id)
    }

    fn check_quantity(&self, product: &Product, requested: i64) -> Result<(), CommerceError> {
        if requested > product.stock {
            return Err(CommerceError::ExceedsStock {
                product_id: product.id.to_string(),
                requested,
                available: product.stock,
            });
        }
        if requested > self.quantity_limit {
            return Err(CommerceError::QuantityExceedsLimit(requested, self.quantity_limit));
        }
        Ok(())
    }

    fn commit(&mut self, items: Vec<CartItem>) -> Result<(), CommerceError> {
        let total = compute_total(&items, self.currency)?;
        self.items = items;
        self.total = total;
        self.updated_at = current_timestamp();
        Ok(())
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

fn compute_total(items: &[CartItem], currency: Currency) -> Result<Money, CommerceError> {
    let lines = items
        .iter()
        .map(CartItem::line_total)
        .collect::<Result<Vec<_>, _>>()?;
    Money::try_sum(lines.iter(), currency).ok_or(CommerceError::Overflow)
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::options::Profile;

    fn ring(id: &str, cents: i64, stock: i64) -> Product {
        Product::new(id, format!("Ring {}", id), Money::new(cents, Currency::USD), stock)
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::default();
        cart.add_item(&ring("r1", 1000, 2), 1).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total().amount_cents, 1000);
        assert!(cart.items()[0].configuration.is_none());
    }

    #[test]
    fn test_add_same_product_increases_quantity() {
        let mut cart = Cart::default();
        let product = ring("r1", 1000, 5);
        let first = cart.add_item(&product, 1).unwrap();
        let second = cart.add_item(&product, 2).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total().amount_cents, 3000);
    }

    #[test]
    fn test_out_of_stock_leaves_cart_unchanged() {
        let mut cart = Cart::default();
        let before = cart.clone();
        let result = cart.add_item(&ring("r1", 1000, 0), 1);

        assert!(matches!(result, Err(CommerceError::OutOfStock { .. })));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_exceeding_stock_is_rejected() {
        let mut cart = Cart::default();
        let product = ring("r1", 1000, 2);
        cart.add_item(&product, 1).unwrap();
        let before = cart.clone();

        let result = cart.add_item(&product, 2);
        assert!(matches!(
            result,
            Err(CommerceError::ExceedsStock { requested: 3, available: 2, .. })
        ));
        assert_eq!(cart, before);

        assert!(cart.add_item(&ring("r2", 500, 1), 2).is_err());
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = Cart::default().with_quantity_limit(3);
        let result = cart.add_item(&ring("r1", 1000, 100), 4);
        assert!(matches!(result, Err(CommerceError::QuantityExceedsLimit(4, 3))));
    }

    #[test]
    fn test_invalid_quantity() {
        let mut cart = Cart::default();
        assert!(cart.add_item(&ring("r1", 1000, 5), 0).is_err());
    }

    #[test]
    fn test_currency_mismatch() {
        let mut cart = Cart::new(Currency::EUR);
        assert!(matches!(
            cart.add_item(&ring("r1", 1000, 5), 1),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::default();
        let product = ring("r1", 1000, 4);
        cart.add_item(&product, 1).unwrap();

        cart.update_quantity(&product.id, 4).unwrap();
        assert_eq!(cart.total().amount_cents, 4000);

        assert!(cart.update_quantity(&product.id, 5).is_err());
        assert_eq!(cart.item_count(), 4);
        assert!(cart.update_quantity(&ProductId::new("nope"), 1).is_err());
    }

    #[test]
    fn test_remove_product_clears_selection() {
        let mut cart = Cart::default();
        let a = ring("r1", 1000, 4);
        let b = ring("r2", 2500, 4);
        let line = cart.add_item(&a, 1).unwrap();
        cart.add_item(&b, 1).unwrap();
        cart.toggle_selection(Some(&line)).unwrap();

        let removal = cart.remove_product(&a.id).unwrap();
        assert_eq!(removal.removed, vec![line]);
        assert!(removal.selection_cleared);
        assert_eq!(cart.selected_item_id(), None);
        assert_eq!(cart.total().amount_cents, 2500);

        assert!(cart.remove_product(&a.id).is_err());
    }

    #[test]
    fn test_toggle_selection() {
        let mut cart = Cart::default();
        let line = cart.add_item(&ring("r1", 1000, 4), 1).unwrap();

        assert_eq!(cart.toggle_selection(Some(&line)).unwrap(), Some(line.clone()));
        assert_eq!(cart.toggle_selection(Some(&line)).unwrap(), None);
        assert_eq!(cart.toggle_selection(Some(&line)).unwrap(), Some(line.clone()));
        assert_eq!(cart.toggle_selection(None).unwrap(), None);
        assert!(cart.toggle_selection(Some(&LineItemId::new("ghost"))).is_err());
    }

    #[test]
    fn test_configuration_written_only_to_selected_line() {
        let mut cart = Cart::default();
        let a = cart.add_item(&ring("r1", 1000, 4), 1).unwrap();
        let b = cart.add_item(&ring("r2", 1000, 4), 1).unwrap();
        let build = ConfiguratorState::default().with_profile(Some(Profile::Flat));

        assert!(!cart.update_configuration(&a, &build));
        cart.toggle_selection(Some(&a)).unwrap();
        assert!(cart.update_configuration(&a, &build));
        assert!(!cart.update_configuration(&b, &build));

        assert_eq!(cart.get_item(&a).unwrap().configuration, Some(build));
        assert_eq!(cart.get_item(&b).unwrap().configuration, None);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::default();
        let line = cart.add_item(&ring("r1", 1000, 4), 2).unwrap();
        cart.toggle_selection(Some(&line)).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
        assert_eq!(cart.selected_item_id(), None);
    }

    #[test]
    fn test_serialized_cart_recomputes_total() {
        let mut cart = Cart::default();
        cart.add_item(&ring("r1", 1250, 4), 2).unwrap();
        let mut json = serde_json::to_value(&cart).unwrap();
        json["total"]["amount_cents"] = serde_json::json!(1);

        let mut loaded: Cart = serde_json::from_value(json).unwrap();
        loaded.recompute_total().unwrap();
        assert_eq!(loaded.total().amount_cents, 2500);
    }

    #[test]
    fn test_heal_selection() {
        let mut cart = Cart::default();
        cart.selected_item_id = Some(LineItemId::new("gone"));
        assert!(cart.heal_selection());
        assert_eq!(cart.selected_item_id(), None);
        assert!(!cart.heal_selection());
    }
}
