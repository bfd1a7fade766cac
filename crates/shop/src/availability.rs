//! Per-product-card availability states.
//!
//! Given the inventory snapshot and the cart, every visible product card
//! maps to exactly one state. The computation is always a full recompute
//! over all cards - no differential updates - so the displayed state can
//! never drift from the stores. It re-runs after the initial inventory
//! fetch, after any cart mutation, and after the post-checkout refresh.

use ezfood_core::{ItemId, Price};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cart::CartStore;
use crate::inventory::InventoryCache;
use crate::resolver;

/// A product card as found in the menu markup.
///
/// `item_id` is the stable inventory identifier embedded in the markup;
/// cards without one fall back to label resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCard {
    #[serde(default)]
    pub item_id: Option<ItemId>,
    pub label: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
}

/// Display state of one product card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    /// Add-button enabled, "Only N left" badge shown.
    Orderable { remaining: u32 },
    /// Quantity stepper shown; increment disabled at the inventory ceiling.
    InCart {
        quantity: u32,
        remaining: u32,
        at_limit: bool,
    },
    /// Add-button disabled, "Out of Stock" badge shown.
    OutOfStock,
    /// No inventory record matched the card at all.
    Unlisted,
}

/// Compute the state of a single card.
#[must_use]
pub fn card_state(cache: &InventoryCache, cart: &CartStore, card: &ProductCard) -> CardState {
    let Some(resolution) = resolver::resolve_with_id(cache, card.item_id, &card.label) else {
        warn!(label = %card.label, "inventory item not found for product card");
        return CardState::Unlisted;
    };

    let remaining = resolution.record.quantity;
    if remaining == 0 {
        return CardState::OutOfStock;
    }

    match cart.get(&card.label) {
        Some(item) => CardState::InCart {
            quantity: item.quantity,
            remaining,
            at_limit: item.quantity >= remaining,
        },
        None => CardState::Orderable { remaining },
    }
}

/// Recompute the state of every card from scratch.
#[must_use]
pub fn card_states(
    cache: &InventoryCache,
    cart: &CartStore,
    cards: &[ProductCard],
) -> Vec<CardState> {
    cards
        .iter()
        .map(|card| card_state(cache, cart, card))
        .collect()
}
