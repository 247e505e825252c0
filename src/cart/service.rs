//! Cart service
//!
//! The only legal way to change cart contents. Every mutation funnels through
//! here so the one-line-per-product invariant is enforced in a single place,
//! and each mutation persists via the [`CartStore`] before returning.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::{
    Cart, LineItem,
    store::{CartStore, CartStoreError},
    summary::CartSummary,
};

/// Errors raised by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Add requested with a quantity below 1.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// The mutation applied in memory but could not be persisted.
    #[error(transparent)]
    Store(#[from] CartStoreError),
}

/// Owns the in-memory cart and keeps it durable through a [`CartStore`].
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn CartStore>,
    cart: Cart,
}

impl std::fmt::Debug for CartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartService")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl CartService {
    /// Creates a service over `store`, loading whatever cart it holds.
    /// Missing or malformed persisted state loads as an empty cart.
    #[must_use]
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        let cart = store.load();
        Self { store, cart }
    }

    /// Adds `quantity` of a product, merging into an existing line when the
    /// product is already in the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] when `quantity` is 0.
    /// - [`CartError::Store`] when persisting fails.
    pub fn add_item(
        &mut self,
        product_id: Uuid,
        name: &str,
        unit_price: Decimal,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }

        self.cart.add(LineItem {
            product_id,
            name: name.to_owned(),
            unit_price,
            quantity,
        });
        self.store.save(&self.cart)?;

        info!(%product_id, name, quantity, "added to cart");

        Ok(())
    }

    /// Sets the quantity of an existing line. Zero or negative removes the
    /// line; an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] when persisting fails.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i64) -> Result<(), CartError> {
        let clamped = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        self.cart.set_quantity(product_id, clamped);
        self.store.save(&self.cart)?;

        Ok(())
    }

    /// Sets a line's quantity from raw text input. Anything that does not
    /// parse to a quantity of at least 1 clamps to 1 rather than erroring or
    /// removing the line, matching the permissive quantity field of the shop
    /// UI. Removal stays explicit via [`Self::remove_item`] or a programmatic
    /// [`Self::set_quantity`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] when persisting fails.
    pub fn set_quantity_from_input(
        &mut self,
        product_id: Uuid,
        raw: &str,
    ) -> Result<(), CartError> {
        let quantity = raw.trim().parse::<i64>().unwrap_or(1).max(1);

        self.set_quantity(product_id, quantity)
    }

    /// Removes the line for `product_id`; a no-op (not an error) when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] when persisting fails.
    pub fn remove_item(&mut self, product_id: Uuid) -> Result<(), CartError> {
        self.cart.remove(product_id);
        self.store.save(&self.cart)?;

        Ok(())
    }

    /// Empties the cart and persists immediately. Used on checkout success
    /// and logout.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Store`] when persisting fails.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.cart.clear();
        self.store.clear()?;

        Ok(())
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Current cart contents.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Derived totals for the current cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(&self.cart)
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }
}
