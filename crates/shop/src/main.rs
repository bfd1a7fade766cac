//! EZ Food shop client - cafeteria ordering flow.
//!
//! Boots the shop state against a running cafeteria server: restores the
//! locally persisted cart and order history, fetches the inventory
//! snapshot and the server order log, and logs a summary of every product
//! card's availability.
//!
//! Configuration comes from `EZFOOD_*` environment variables (see
//! [`ezfood_shop::config`]); a `.env` file is honored when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use ezfood_shop::ShopApp;
use ezfood_shop::config::ShopConfig;

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ezfood_shop=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = ShopConfig::from_env().expect("Failed to load configuration");

    let mut app = ShopApp::new(&config).expect("Failed to initialize shop state");

    let menu = app.load_menu().await;
    app.set_product_cards(menu);
    app.bootstrap().await;

    let view = app.render();
    tracing::info!(
        products = view.cards.len(),
        cart_units = view.cart.unit_count,
        cart_total = %view.cart.total,
        recent_orders = view.history.recent.len(),
        "shop ready"
    );
    for card in &view.cards {
        tracing::info!(
            label = %card.label,
            price = %card.price,
            badge = card.badge.as_deref().unwrap_or("-"),
            orderable = card.add_enabled || card.stepper.is_some(),
            "product card"
        );
    }
}
