//! The cart store.
//!
//! An ordered collection of cart items, at most one entry per display name.
//! Every quantity change is checked against the inventory snapshot; the
//! cart never holds a zero-quantity entry and never exceeds the matched
//! record's quantity at the time of the check.
//!
//! The store is pure state - persistence and re-rendering are driven by the
//! owning [`ShopApp`](crate::state::ShopApp) after every mutation.

use ezfood_core::{ItemId, Price};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inventory::InventoryCache;
use crate::resolver;

/// A line in the cart, keyed by its display name.
///
/// `item_id` is the inventory record the line resolved to when it was
/// added; later quantity checks reuse it so that lines whose display name
/// has no fuzzy match stay adjustable. Absent in carts persisted before
/// the field existed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
}

impl CartItem {
    /// The line total for this entry.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.quantity)
    }
}

/// Cart mutation failures, each carrying its user-facing notice.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// No matching inventory record, or the record's quantity is zero.
    #[error("\"{name}\" is out of stock")]
    OutOfStock { name: String },

    /// The mutation would exceed the matched record's quantity.
    #[error("only {available} of \"{name}\" available")]
    LimitReached { name: String, available: u32 },

    /// The named entry is not in the cart.
    #[error("\"{name}\" is not in the cart")]
    NotInCart { name: String },
}

/// Ordered cart contents.
#[derive(Debug, Default, Clone)]
pub struct CartStore {
    items: Vec<CartItem>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a cart from persisted items.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// Add one unit of a product to the cart.
    ///
    /// Inserts a new quantity-1 entry, or increments an existing entry for
    /// the same display name. Returns the entry's new quantity.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`] when no inventory record matches the
    ///   name (via the resolver cascade, id fast path first) or its
    ///   quantity is zero
    /// - [`CartError::LimitReached`] when the increment would exceed the
    ///   matched record's quantity
    pub fn add(
        &mut self,
        cache: &InventoryCache,
        item_id: Option<ItemId>,
        name: &str,
        price: Price,
        image: &str,
    ) -> Result<u32, CartError> {
        let (resolved_id, available) = resolver::resolve_with_id(cache, item_id, name)
            .map(|resolution| (resolution.record.id, resolution.record.quantity))
            .filter(|(_, quantity)| *quantity > 0)
            .ok_or_else(|| CartError::OutOfStock {
                name: name.to_string(),
            })?;

        if let Some(existing) = self.items.iter_mut().find(|item| item.name == name) {
            if existing.quantity >= available {
                return Err(CartError::LimitReached {
                    name: name.to_string(),
                    available,
                });
            }
            existing.quantity += 1;
            existing.item_id = Some(resolved_id);
            return Ok(existing.quantity);
        }

        self.items.push(CartItem {
            name: name.to_string(),
            price,
            image: image.to_string(),
            quantity: 1,
            item_id: Some(resolved_id),
        });
        Ok(1)
    }

    /// Increase an entry's quantity by one, rejected at the inventory
    /// ceiling exactly like [`Self::add`]. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`], [`CartError::OutOfStock`] or
    /// [`CartError::LimitReached`].
    pub fn increment(&mut self, cache: &InventoryCache, name: &str) -> Result<u32, CartError> {
        let stored_id = self.get(name).and_then(|item| item.item_id);
        let available = resolver::resolve_with_id(cache, stored_id, name)
            .map(|resolution| resolution.record.quantity)
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| CartError::OutOfStock {
                name: name.to_string(),
            })?;

        let item = self
            .items
            .iter_mut()
            .find(|item| item.name == name)
            .ok_or_else(|| CartError::NotInCart {
                name: name.to_string(),
            })?;

        if item.quantity >= available {
            return Err(CartError::LimitReached {
                name: name.to_string(),
                available,
            });
        }
        item.quantity += 1;
        Ok(item.quantity)
    }

    /// Decrease an entry's quantity by one, removing the entry when it
    /// drops to zero. Returns the new quantity (0 means removed).
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`] when the entry does not exist.
    pub fn decrement(&mut self, name: &str) -> Result<u32, CartError> {
        let position = self
            .items
            .iter()
            .position(|item| item.name == name)
            .ok_or_else(|| CartError::NotInCart {
                name: name.to_string(),
            })?;

        match self.items.get_mut(position) {
            Some(item) if item.quantity > 1 => {
                item.quantity -= 1;
                Ok(item.quantity)
            }
            _ => {
                self.items.remove(position);
                Ok(0)
            }
        }
    }

    /// Delete an entry unconditionally. A no-op when the name is absent.
    pub fn remove(&mut self, name: &str) {
        self.items.retain(|item| item.name != name);
    }

    /// Empty the cart (used after successful checkout).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up an entry by display name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Total unit count across all entries (the cart badge number).
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Running total across all entries.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the cart holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
