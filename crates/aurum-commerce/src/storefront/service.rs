//! The storefront service.
//!
//! One `Storefront` owns the cart, the live ring build and the step cursor
//! for a single shopper session. All writes go through it, so there is one
//! writer and no locking beyond `&mut self`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cart::Cart;
use crate::catalog::{Product, WeightRange};
use crate::checkout::OrderDraft;
use crate::config::StorefrontConfig;
use crate::configurator::{
    ConfigUpdate, ConfiguratorState, ConfiguratorStep, StepCursor, StepTransition,
};
use crate::error::CommerceError;
use crate::ids::{LineItemId, ProductId};
use crate::money::Currency;
use crate::notify::{Notice, NotificationSink};
use crate::storefront::store::{CartStore, KvCartStore};

/// Cart, configurator and durable store for one shopper.
///
/// Starts in the loading state with an empty cart; call [`hydrate`] once
/// before mutating.
///
/// [`hydrate`]: Storefront::hydrate
pub struct Storefront {
    cart: Cart,
    configurator: ConfiguratorState,
    cursor: StepCursor,
    loading: bool,
    quantity_limit: i64,
    store: Arc<dyn CartStore>,
    sink: Arc<dyn NotificationSink>,
}

impl Storefront {
    pub fn new(store: Arc<dyn CartStore>, sink: Arc<dyn NotificationSink>) -> Self {
        let cart = Cart::default();
        let quantity_limit = crate::cart::MAX_QUANTITY_PER_ITEM;
        Self {
            cart,
            configurator: ConfiguratorState::default(),
            cursor: StepCursor::new(),
            loading: true,
            quantity_limit,
            store,
            sink,
        }
    }

    /// Build a storefront from configuration, opening the configured store.
    pub fn from_config(
        config: &StorefrontConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, CommerceError> {
        config.validate()?;
        let cache = config.store.open()?;
        let store = KvCartStore::new(cache, config.store.cart_key.clone());
        Ok(Self::new(Arc::new(store), sink)
            .with_currency(config.currency)
            .with_quantity_limit(config.max_quantity_per_item))
    }

    /// Set the currency of the cart hydration starts from.
    ///
    /// Ignored once hydrated; a restored cart keeps its own currency.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        if self.loading {
            self.cart = Cart::new(currency).with_quantity_limit(self.quantity_limit);
        } else if self.cart.currency != currency {
            warn!(
                cart = %self.cart.currency,
                requested = %currency,
                "Cart already hydrated, keeping its currency"
            );
        }
        self
    }

    pub fn with_quantity_limit(mut self, limit: i64) -> Self {
        self.quantity_limit = limit;
        self.cart.set_quantity_limit(limit);
        self
    }

    /// Restore the cart from the durable store and clear the loading flag.
    ///
    /// A missing or unreadable cart leaves the empty cart in place. Does
    /// nothing once hydrated.
    pub async fn hydrate(&mut self) {
        if !self.loading {
            return;
        }

        match self.store.load().await {
            Ok(Some(mut cart)) => match cart.recompute_total() {
                Ok(()) => {
                    cart.set_quantity_limit(self.quantity_limit);
                    if cart.heal_selection() {
                        debug!("Dropped selection of a line that no longer exists");
                    }
                    self.configurator = cart
                        .selected_item()
                        .and_then(|item| item.configuration.clone())
                        .unwrap_or_default();
                    info!(
                        cart_id = %cart.id,
                        lines = cart.items().len(),
                        total = %cart.total(),
                        "Cart hydrated"
                    );
                    self.cart = cart;
                }
                Err(e) => warn!(error = %e, "Stored cart is unusable, starting empty"),
            },
            Ok(None) => debug!("No stored cart, starting empty"),
            Err(e) => warn!(error = %e, "Failed to load cart, starting empty"),
        }

        self.loading = false;
    }

    /// Add `quantity` of `product`, merging with an existing line.
    pub async fn add_to_cart(
        &mut self,
        product: &Product,
        quantity: i64,
    ) -> Result<LineItemId, CommerceError> {
        self.ensure_loaded("add_to_cart")?;
        match self.cart.add_item(product, quantity) {
            Ok(line) => {
                info!(product_id = %product.id, quantity, line_id = %line, "Added to cart");
                self.sink.notify(Notice::ProductAdded {
                    product_id: product.id.clone(),
                    quantity,
                });
                self.persist().await;
                Ok(line)
            }
            Err(e) => Err(self.rejected(&product.id, e)),
        }
    }

    /// Remove every line for `product_id`.
    ///
    /// If the line being configured goes, the configurator is reset and
    /// the cursor returns to the first step.
    pub async fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<(), CommerceError> {
        self.ensure_loaded("remove_from_cart")?;
        let removal = self
            .cart
            .remove_product(product_id)
            .map_err(|e| self.rejected(product_id, e))?;

        if removal.selection_cleared {
            debug!(product_id = %product_id, "Removed the line being configured");
            self.reset_configurator();
        }
        info!(product_id = %product_id, lines = removal.removed.len(), "Removed from cart");
        self.sink.notify(Notice::ProductRemoved {
            product_id: product_id.clone(),
        });
        self.persist().await;
        Ok(())
    }

    /// Replace the quantity on the line for `product_id`.
    pub async fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        self.ensure_loaded("update_quantity")?;
        self.cart
            .update_quantity(product_id, quantity)
            .map_err(|e| self.rejected(product_id, e))?;

        info!(product_id = %product_id, quantity, "Quantity updated");
        self.sink.notify(Notice::CartUpdated {
            product_id: product_id.clone(),
            quantity,
        });
        self.persist().await;
        Ok(())
    }

    /// Empty the cart.
    pub async fn clear_cart(&mut self) -> Result<(), CommerceError> {
        self.ensure_loaded("clear_cart")?;
        self.cart.clear();
        self.reset_configurator();
        info!(cart_id = %self.cart.id, "Cart cleared");
        self.sink.notify(Notice::CartCleared);
        self.persist().await;
        Ok(())
    }

    /// Toggle which line the configurator edits.
    ///
    /// Selecting a line loads a copy of its stored build, or a default build
    /// if it has none. Selecting the selected line again, or passing `None`,
    /// deselects and resets the configurator to defaults.
    pub async fn select_cart_item(
        &mut self,
        id: Option<&LineItemId>,
    ) -> Result<Option<LineItemId>, CommerceError> {
        self.ensure_loaded("select_cart_item")?;
        let selected = self.cart.toggle_selection(id)?;

        self.configurator = self
            .cart
            .selected_item()
            .and_then(|item| item.configuration.clone())
            .unwrap_or_default();
        match &selected {
            Some(line) => debug!(line_id = %line, "Configuring line"),
            None => debug!("Configurator deselected"),
        }
        self.persist().await;
        Ok(selected)
    }

    /// Store a whole build on `item_id` if it is the selected line.
    ///
    /// Returns whether the build was written. The live configurator follows
    /// the written build.
    pub async fn update_configuration(
        &mut self,
        item_id: &LineItemId,
        state: ConfiguratorState,
    ) -> bool {
        if !self.cart.update_configuration(item_id, &state) {
            debug!(line_id = %item_id, "Ignored configuration for a line that is not selected");
            return false;
        }
        self.configurator = state;
        self.persist().await;
        true
    }

    /// Apply one edit to the live build and write it through to the
    /// selected line, if any.
    ///
    /// A rejected edit leaves the build unchanged.
    pub async fn configure(&mut self, update: ConfigUpdate) -> Result<(), CommerceError> {
        let name = update.name();
        let range = self.weight_range();
        let next = self
            .configurator
            .clone()
            .apply(update, &range)
            .inspect_err(|e| warn!(update = name, error = %e, "Configuration edit rejected"))?;
        self.configurator = next;
        debug!(update = name, "Configuration updated");

        if let Some(line) = self.cart.selected_item_id().cloned() {
            if self.cart.update_configuration(&line, &self.configurator) {
                self.persist().await;
            }
        }
        Ok(())
    }

    /// Press "Next". A blocked step emits a validation notice.
    pub fn next_step(&mut self) -> StepTransition {
        let transition = self.cursor.next(&self.configurator);
        match transition {
            StepTransition::Advanced(step) => debug!(step = step.as_str(), "Advanced"),
            StepTransition::Completed => info!("Ring configuration complete"),
            StepTransition::Blocked(err) => {
                debug!(step = err.step.as_str(), reason = err.reason.message_key(), "Step blocked");
                self.sink.notify(Notice::StepValidation { reason: err.reason });
            }
        }
        transition
    }

    /// Press "Back".
    pub fn prev_step(&mut self) -> ConfiguratorStep {
        self.cursor.prev()
    }

    /// Open a step directly.
    pub fn go_to_step(&mut self, step: ConfiguratorStep) {
        self.cursor.go_to(step);
    }

    /// Order payload for checkout.
    pub fn order_draft(&self) -> Result<OrderDraft, CommerceError> {
        self.ensure_loaded("order_draft")?;
        OrderDraft::from_cart(&self.cart)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The live build. Callers get a borrow; use `clone` for a copy.
    pub fn configurator(&self) -> &ConfiguratorState {
        &self.configurator
    }

    pub fn current_step(&self) -> ConfiguratorStep {
        self.cursor.current()
    }

    pub fn progress_percent(&self) -> u8 {
        self.cursor.progress_percent()
    }

    fn ensure_loaded(&self, operation: &'static str) -> Result<(), CommerceError> {
        if self.loading {
            warn!(operation, "Cart is still loading");
            return Err(CommerceError::CartLoading);
        }
        Ok(())
    }

    /// Report a rejected cart mutation and hand the error back.
    fn rejected(&self, product_id: &ProductId, err: CommerceError) -> CommerceError {
        if !err.is_stock_violation() {
            warn!(product_id = %product_id, error = %err, "Cart mutation rejected");
            return err;
        }
        warn!(product_id = %product_id, error = %err, "Stock check failed");
        match &err {
            CommerceError::OutOfStock { .. } => self.sink.notify(Notice::OutOfStock {
                product_id: product_id.clone(),
            }),
            CommerceError::ExceedsStock {
                requested,
                available,
                ..
            } => self.sink.notify(Notice::ExceedsStock {
                product_id: product_id.clone(),
                requested: *requested,
                available: *available,
            }),
            _ => {}
        }
        err
    }

    fn reset_configurator(&mut self) {
        self.configurator = ConfiguratorState::default();
        self.cursor.reset();
    }

    /// Weight bounds of the product being configured.
    fn weight_range(&self) -> WeightRange {
        let Some(item) = self.cart.selected_item() else {
            return WeightRange::unbounded();
        };
        item.product.weight_range().unwrap_or_else(|e| {
            warn!(product_id = %item.product.id, error = %e, "Ignoring product weight range");
            WeightRange::unbounded()
        })
    }

    async fn persist(&self) {
        if let Err(e) = self.store.save(&self.cart).await {
            warn!(cart_id = %self.cart.id, error = %e, "Failed to persist cart");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::options::Profile;
    use crate::money::Money;
    use crate::notify::RecordingSink;

    fn ring(id: &str, stock: i64) -> Product {
        Product::new(id, "Band", Money::new(1000, Currency::USD), stock).with_weight("4-8")
    }

    async fn storefront() -> (Storefront, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let mut shop = Storefront::new(Arc::new(KvCartStore::in_memory()), sink.clone());
        shop.hydrate().await;
        (shop, sink)
    }

    #[tokio::test]
    async fn test_mutations_wait_for_hydration() {
        let sink = Arc::new(RecordingSink::new());
        let mut shop = Storefront::new(Arc::new(KvCartStore::in_memory()), sink.clone());
        assert!(shop.is_loading());

        let result = shop.add_to_cart(&ring("r1", 2), 1).await;
        assert!(matches!(result, Err(CommerceError::CartLoading)));
        assert!(sink.notices().is_empty());

        shop.hydrate().await;
        assert!(!shop.is_loading());
        assert!(shop.add_to_cart(&ring("r1", 2), 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_add_notifies() {
        let (mut shop, sink) = storefront().await;
        assert!(shop.add_to_cart(&ring("r1", 0), 1).await.is_err());
        assert_eq!(sink.keys(), vec!["outOfStock"]);
        assert!(shop.cart().is_empty());
    }

    #[tokio::test]
    async fn test_weight_clamped_to_selected_product() {
        let (mut shop, _) = storefront().await;
        let line = shop.add_to_cart(&ring("r1", 2), 1).await.unwrap();
        shop.select_cart_item(Some(&line)).await.unwrap();

        shop.configure(ConfigUpdate::Weight(20.0)).await.unwrap();
        assert_eq!(shop.configurator().weight, 8.0);
        let stored = shop.cart().get_item(&line).unwrap().configuration.clone();
        assert_eq!(stored.map(|c| c.weight), Some(8.0));
    }

    #[tokio::test]
    async fn test_unselected_edits_are_not_stored() {
        let (mut shop, _) = storefront().await;
        let line = shop.add_to_cart(&ring("r1", 2), 1).await.unwrap();

        shop.configure(ConfigUpdate::Profile(Some(Profile::Flat))).await.unwrap();
        assert_eq!(shop.configurator().selected_profile, Some(Profile::Flat));
        assert!(shop.cart().get_item(&line).unwrap().configuration.is_none());
    }

    #[tokio::test]
    async fn test_blocked_step_notifies() {
        let (mut shop, sink) = storefront().await;
        assert!(matches!(shop.next_step(), StepTransition::Advanced(ConfiguratorStep::Profile)));
        assert!(matches!(shop.next_step(), StepTransition::Blocked(_)));
        assert_eq!(shop.current_step(), ConfiguratorStep::Profile);
        assert_eq!(sink.keys(), vec!["selectProfile"]);
    }

    #[tokio::test]
    async fn test_clear_cart_resets_configurator() {
        let (mut shop, sink) = storefront().await;
        let line = shop.add_to_cart(&ring("r1", 2), 1).await.unwrap();
        shop.select_cart_item(Some(&line)).await.unwrap();
        shop.go_to_step(ConfiguratorStep::Stones);

        shop.clear_cart().await.unwrap();
        assert!(shop.cart().is_empty());
        assert_eq!(shop.current_step(), ConfiguratorStep::Weight);
        assert_eq!(shop.configurator(), &ConfiguratorState::default());
        assert_eq!(sink.keys().last(), Some(&"cartCleared"));
    }

    #[tokio::test]
    async fn test_currency_change_after_hydration_keeps_cart() {
        let (mut shop, _) = storefront().await;
        let line = shop.add_to_cart(&ring("r1", 2), 2).await.unwrap();
        shop.select_cart_item(Some(&line)).await.unwrap();

        let shop = shop.with_currency(Currency::EUR);
        assert_eq!(shop.cart().currency, Currency::USD);
        assert_eq!(shop.cart().item_count(), 2);
        assert_eq!(shop.cart().selected_item_id(), Some(&line));
        assert_eq!(shop.cart().total(), Money::new(2000, Currency::USD));
    }

    #[tokio::test]
    async fn test_currency_applies_before_hydration() {
        let shop = Storefront::new(
            Arc::new(KvCartStore::in_memory()),
            Arc::new(RecordingSink::new()),
        )
        .with_quantity_limit(3)
        .with_currency(Currency::CHF);
        assert_eq!(shop.cart().currency, Currency::CHF);

        let mut shop = shop;
        shop.hydrate().await;
        let band = Product::new("r1", "Band", Money::new(1000, Currency::CHF), 10);
        assert!(matches!(
            shop.add_to_cart(&band, 4).await,
            Err(CommerceError::QuantityExceedsLimit(4, 3))
        ));
    }
}
