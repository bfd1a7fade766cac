//! Local persistence for cart and order history.
//!
//! The durable client-side copy of the cart and the order history, written
//! as JSON files under the configured data directory (the `cart` and
//! `orderHistory` keys of the original browser storage). Loads tolerate a
//! missing or unreadable file by falling back to empty state; saves
//! propagate their errors.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::fs;
use tracing::error;

use crate::api::types::Order;
use crate::cart::CartItem;

const CART_FILE: &str = "cart.json";
const HISTORY_FILE: &str = "order_history.json";
const MENU_FILE: &str = "menu.json";

/// Errors that can occur while persisting local state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// JSON-file store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the persisted cart, or an empty one.
    pub async fn load_cart(&self) -> Vec<CartItem> {
        load_json(&self.dir.join(CART_FILE)).await
    }

    /// Persist the full cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub async fn save_cart(&self, items: &[CartItem]) -> Result<(), StorageError> {
        self.save_json(CART_FILE, &items).await
    }

    /// Load the persisted order history (newest first), or an empty one.
    pub async fn load_history(&self) -> Vec<Order> {
        load_json(&self.dir.join(HISTORY_FILE)).await
    }

    /// Persist the full order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub async fn save_history(&self, orders: &[Order]) -> Result<(), StorageError> {
        self.save_json(HISTORY_FILE, &orders).await
    }

    /// Load the product-card menu used by the bootstrap binary, or an
    /// empty one. The menu is the client's stand-in for the page markup
    /// the original read its cards from.
    pub async fn load_menu(&self) -> Vec<crate::availability::ProductCard> {
        load_json(&self.dir.join(MENU_FILE)).await
    }

    async fn save_json<T: Serialize + ?Sized>(
        &self,
        file: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).await?;
        let payload = serde_json::to_vec_pretty(value)?;
        fs::write(self.dir.join(file), payload).await?;
        Ok(())
    }
}

async fn load_json<T: Default + DeserializeOwned>(path: &Path) -> T {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                error!(path = %path.display(), "failed to parse data file: {err}");
                T::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => T::default(),
        Err(err) => {
            error!(path = %path.display(), "failed to read data file: {err}");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezfood_core::{ItemId, Price};

    fn temp_store(tag: &str) -> LocalStore {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let mut dir = std::env::temp_dir();
        dir.push(format!("ezfood_{tag}_{}_{nanos}", std::process::id()));
        LocalStore::new(dir)
    }

    #[tokio::test]
    async fn cart_round_trips_through_disk() {
        let store = temp_store("cart");
        let items = vec![
            CartItem {
                name: "Samosa".to_string(),
                price: Price::from_units(20),
                image: "samosa.png".to_string(),
                quantity: 2,
                item_id: Some(ItemId::new(1)),
            },
            CartItem {
                name: "Juice".to_string(),
                price: Price::from_units(50),
                image: String::new(),
                quantity: 1,
                item_id: None,
            },
        ];

        store.save_cart(&items).await.expect("save");
        let loaded = store.load_cart().await;
        assert_eq!(loaded, items);
    }

    #[tokio::test]
    async fn missing_files_load_as_empty() {
        let store = temp_store("missing");
        assert!(store.load_cart().await.is_empty());
        assert!(store.load_history().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_files_load_as_empty() {
        let store = temp_store("corrupt");
        store.save_cart(&[]).await.expect("create dir");
        fs::write(store.dir.join(CART_FILE), b"{not json")
            .await
            .expect("write");
        assert!(store.load_cart().await.is_empty());
    }

    #[tokio::test]
    async fn history_round_trip_preserves_order_and_fields() {
        let store = temp_store("history");
        let orders: Vec<Order> = serde_json::from_str(
            r#"[
                {"orderId":"CMS-222222","studentId":"s2","date":1700000100000,"items":[]},
                {"orderId":"CMS-111111","studentId":"s1","date":1700000000000,
                 "items":[{"name":"Samosa","price":20.0,"image":"","quantity":2}]}
            ]"#,
        )
        .expect("orders");

        store.save_history(&orders).await.expect("save");
        let loaded = store.load_history().await;
        assert_eq!(loaded, orders);
    }
}
