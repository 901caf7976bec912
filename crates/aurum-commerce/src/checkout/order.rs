//! Order draft types.

use crate::cart::Cart;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// What the storefront sends to checkout.
///
/// Ring builds stay in the cart; only products, quantities and prices
/// are transmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

/// A line in an order draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl OrderDraft {
    /// Build a draft from the current cart contents.
    pub fn from_cart(cart: &Cart) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let lines = cart
            .items()
            .iter()
            .map(|item| {
                Ok(OrderLine {
                    product_id: item.product.id.clone(),
                    product_name: item.product.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.product.price,
                    line_total: item.line_total()?,
                })
            })
            .collect::<Result<Vec<_>, CommerceError>>()?;
        Ok(Self {
            lines,
            total: cart.total(),
        })
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::configurator::ConfiguratorState;
    use crate::money::Currency;

    #[test]
    fn test_empty_cart_has_no_draft() {
        assert!(matches!(
            OrderDraft::from_cart(&Cart::default()),
            Err(CommerceError::EmptyCart)
        ));
    }

    #[test]
    fn test_draft_lines_and_total() {
        let mut cart = Cart::default();
        let band = Product::new("band", "Wedding band", Money::new(89000, Currency::USD), 5);
        let solitaire = Product::new("sol", "Solitaire", Money::new(150000, Currency::USD), 2);
        let line = cart.add_item(&band, 2).unwrap();
        cart.add_item(&solitaire, 1).unwrap();
        cart.toggle_selection(Some(&line)).unwrap();
        cart.update_configuration(&line, &ConfiguratorState::default());

        let draft = OrderDraft::from_cart(&cart).unwrap();
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].line_total.amount_cents, 178000);
        assert_eq!(draft.total.amount_cents, 328000);
        assert_eq!(draft.item_count(), 3);

        let json = serde_json::to_string(&draft).unwrap();
        assert!(!json.contains("configuration"));
    }
}
