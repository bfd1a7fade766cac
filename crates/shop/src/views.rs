//! Plain display data for a rendering layer.
//!
//! The business logic never touches a UI; instead every mutation hands
//! back a [`ShopView`] recomputed from scratch, and a thin rendering layer
//! (terminal, HTML, whatever) draws it. Formatting follows the original
//! page: `₹` prices with two decimals, order dates in Indian Standard
//! Time, and at most three recent orders inline.

use chrono::{DateTime, FixedOffset, Utc};
use ezfood_core::Price;

use crate::api::types::Order;
use crate::availability::{self, CardState, ProductCard};
use crate::cart::CartStore;
use crate::inventory::InventoryCache;

/// How many orders the inline history shows before "view all".
pub const RECENT_ORDER_LIMIT: usize = 3;

/// Quantity stepper shown on an in-cart product card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepperView {
    pub quantity: u32,
    pub increment_enabled: bool,
}

/// One product card, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub label: String,
    pub price: String,
    /// "Only N left" / "Out of Stock"; `None` for unlisted cards.
    pub badge: Option<String>,
    pub add_enabled: bool,
    pub stepper: Option<StepperView>,
}

/// One line of the cart sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub name: String,
    pub image: String,
    pub quantity: u32,
    /// e.g. `₹50 × 3 = ₹150.00`
    pub breakdown: String,
}

/// The cart sidebar and badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub unit_count: u32,
}

impl CartView {
    /// An empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total: format_price(Price::ZERO),
            unit_count: 0,
        }
    }
}

/// One order in the history section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub order_id: String,
    pub student_id: String,
    pub placed_at: String,
    pub total: String,
    /// e.g. `Samosa × 2 - ₹40.00`
    pub lines: Vec<String>,
}

/// The inline order-history section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHistoryView {
    pub recent: Vec<OrderView>,
    pub more_available: bool,
}

/// Everything the page draws, recomputed in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopView {
    pub cards: Vec<ProductCardView>,
    pub cart: CartView,
    pub history: OrderHistoryView,
}

/// Recompute all surfaces from the current state.
#[must_use]
pub fn render(
    cards: &[ProductCard],
    inventory: &InventoryCache,
    cart: &CartStore,
    history: &[Order],
) -> ShopView {
    let cards = cards
        .iter()
        .map(|card| card_view(card, availability::card_state(inventory, cart, card)))
        .collect();

    ShopView {
        cards,
        cart: cart_view(cart),
        history: history_view(history),
    }
}

fn card_view(card: &ProductCard, state: CardState) -> ProductCardView {
    let (badge, add_enabled, stepper) = match state {
        CardState::Orderable { remaining } => (Some(format!("Only {remaining} left")), true, None),
        CardState::InCart {
            quantity,
            remaining,
            at_limit,
        } => (
            Some(format!("Only {remaining} left")),
            false,
            Some(StepperView {
                quantity,
                increment_enabled: !at_limit,
            }),
        ),
        CardState::OutOfStock => (Some("Out of Stock".to_string()), false, None),
        CardState::Unlisted => (None, false, None),
    };

    ProductCardView {
        label: card.label.clone(),
        price: format_price(card.price),
        badge,
        add_enabled,
        stepper,
    }
}

fn cart_view(cart: &CartStore) -> CartView {
    let lines = cart
        .items()
        .iter()
        .map(|item| CartLineView {
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            breakdown: format!(
                "₹{} × {} = {}",
                item.price.amount(),
                item.quantity,
                format_price(item.line_total())
            ),
        })
        .collect();

    CartView {
        lines,
        total: format_price(cart.total()),
        unit_count: cart.unit_count(),
    }
}

fn history_view(history: &[Order]) -> OrderHistoryView {
    let recent = history
        .iter()
        .take(RECENT_ORDER_LIMIT)
        .map(|order| OrderView {
            order_id: order.order_id.to_string(),
            student_id: order.student_id.to_string(),
            placed_at: format_order_date(order.date),
            total: format_price(order.total()),
            lines: order
                .items
                .iter()
                .map(|item| {
                    format!(
                        "{} × {} - {}",
                        item.name,
                        item.quantity,
                        format_price(item.line_total())
                    )
                })
                .collect(),
        })
        .collect();

    OrderHistoryView {
        recent,
        more_available: history.len() > RECENT_ORDER_LIMIT,
    }
}

/// Format a price for display, e.g. `₹150.00`.
#[must_use]
pub fn format_price(price: Price) -> String {
    format!("₹{:.2}", price.amount())
}

/// Format an order date in Indian Standard Time, matching the original
/// page's locale formatting (e.g. `14/11/2023, 10:43:20 pm`).
#[must_use]
pub fn format_order_date(date: DateTime<Utc>) -> String {
    // IST has no DST; the fixed +05:30 offset is always in range.
    let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("valid offset");
    date.with_timezone(&ist)
        .format("%d/%m/%Y, %I:%M:%S %P")
        .to_string()
}
