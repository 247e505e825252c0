//! Cart store
//!
//! Durable single-key persistence for cart contents, the crate's analogue of
//! the browser's local-storage cart entry. One writer per store is assumed;
//! concurrent processes racing on the same file can lose an update, which is
//! an accepted limitation of the demo.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use mockall::automock;
use thiserror::Error;
use tracing::{debug, warn};

use super::Cart;

/// Callback invoked with the new item count after every persisted change,
/// feeding whatever badge or indicator the embedding UI renders.
pub type ItemCountListener = Arc<dyn Fn(u64) + Send + Sync>;

/// Errors raised while persisting cart state. Loading never raises; missing
/// or malformed data loads as an empty cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// Underlying file could not be written.
    #[error("failed to write cart state")]
    Io(#[from] io::Error),

    /// Cart contents could not be serialized.
    #[error("failed to encode cart state")]
    Encode(#[from] serde_json::Error),
}

/// Read/write access to the persisted cart.
#[automock]
pub trait CartStore: Send + Sync {
    /// Returns the persisted cart; an empty cart when nothing usable is
    /// stored.
    fn load(&self) -> Cart;

    /// Persists the full cart and notifies any item-count listener.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] when the state cannot be written.
    fn save(&self, cart: &Cart) -> Result<(), CartStoreError>;

    /// Resets to an empty cart and persists immediately.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] when the state cannot be written.
    fn clear(&self) -> Result<(), CartStoreError>;
}

/// Cart store backed by a single JSON file.
///
/// The file holds the same shape the shop front-end keeps under its
/// local-storage key: a JSON array of `{product_id, name, price, quantity}`.
#[derive(Clone)]
pub struct JsonFileCartStore {
    path: PathBuf,
    listener: Option<ItemCountListener>,
}

impl std::fmt::Debug for JsonFileCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileCartStore")
            .field("path", &self.path)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl JsonFileCartStore {
    /// Creates a store persisting to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            listener: None,
        }
    }

    /// Registers a listener invoked with the item count after each persisted
    /// change.
    #[must_use]
    pub fn with_listener(mut self, listener: ItemCountListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, cart: &Cart) -> Result<(), CartStoreError> {
        let encoded = serde_json::to_vec(cart)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, encoded)?;
        debug!(items = cart.item_count(), "cart state persisted");

        if let Some(listener) = &self.listener {
            listener(cart.item_count());
        }

        Ok(())
    }
}

impl CartStore for JsonFileCartStore {
    fn load(&self) -> Cart {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Cart::new(),
            Err(error) => {
                warn!(%error, path = %self.path.display(), "cart state unreadable; starting empty");
                return Cart::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(cart) => cart,
            Err(error) => {
                warn!(%error, path = %self.path.display(), "cart state malformed; starting empty");
                Cart::new()
            }
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.persist(cart)
    }

    fn clear(&self) -> Result<(), CartStoreError> {
        self.persist(&Cart::new())
    }
}

/// Volatile cart store for tests and short-lived sessions.
#[derive(Clone, Default)]
pub struct MemoryCartStore {
    cart: Arc<Mutex<Cart>>,
    listener: Option<ItemCountListener>,
}

impl std::fmt::Debug for MemoryCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCartStore")
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl MemoryCartStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener invoked with the item count after each change.
    #[must_use]
    pub fn with_listener(mut self, listener: ItemCountListener) -> Self {
        self.listener = Some(listener);
        self
    }

    fn replace(&self, cart: Cart) {
        let count = cart.item_count();

        if let Ok(mut guard) = self.cart.lock() {
            *guard = cart;
        }

        if let Some(listener) = &self.listener {
            listener(count);
        }
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> Cart {
        self.cart.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.replace(cart.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CartStoreError> {
        self.replace(Cart::new());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use rust_decimal::Decimal;
    use testresult::TestResult;
    use uuid::Uuid;

    use super::*;
    use crate::cart::LineItem;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(LineItem {
            product_id: Uuid::now_v7(),
            name: "Mechanical Keyboard".to_owned(),
            unit_price: Decimal::new(8999, 2),
            quantity: 2,
        });
        cart.add(LineItem {
            product_id: Uuid::now_v7(),
            name: "Wireless Mouse".to_owned(),
            unit_price: Decimal::new(1999, 2),
            quantity: 1,
        });
        cart
    }

    #[test]
    fn round_trips_through_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileCartStore::new(dir.path().join("cart.json"));
        let cart = sample_cart();

        store.save(&cart)?;

        assert_eq!(store.load(), cart);

        Ok(())
    }

    #[test]
    fn missing_file_loads_as_empty_cart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileCartStore::new(dir.path().join("absent.json"));

        assert!(store.load().is_empty());

        Ok(())
    }

    #[test]
    fn malformed_file_loads_as_empty_cart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cart.json");
        fs::write(&path, b"{not json")?;

        let store = JsonFileCartStore::new(path);

        assert!(store.load().is_empty());

        Ok(())
    }

    #[test]
    fn clear_persists_an_empty_cart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileCartStore::new(dir.path().join("cart.json"));
        store.save(&sample_cart())?;

        store.clear()?;

        assert!(store.load().is_empty());

        Ok(())
    }

    #[test]
    fn listener_sees_item_count_on_save_and_clear() -> TestResult {
        let dir = tempfile::tempdir()?;
        let seen = Arc::new(AtomicU64::new(u64::MAX));
        let seen_by_listener = Arc::clone(&seen);

        let store = JsonFileCartStore::new(dir.path().join("cart.json")).with_listener(Arc::new(
            move |count| {
                seen_by_listener.store(count, Ordering::SeqCst);
            },
        ));

        store.save(&sample_cart())?;
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        store.clear()?;
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        Ok(())
    }

    #[test]
    fn memory_store_round_trips() -> TestResult {
        let store = MemoryCartStore::new();
        let cart = sample_cart();

        store.save(&cart)?;
        assert_eq!(store.load(), cart);

        store.clear()?;
        assert!(store.load().is_empty());

        Ok(())
    }
}
