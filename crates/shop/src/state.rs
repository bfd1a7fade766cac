//! Application state shared by the shop flow.
//!
//! [`ShopApp`] replaces the original's global mutable variables (cart,
//! inventory snapshot, order history) with one explicit state object.
//! All mutation goes through its operations; every cart mutation persists
//! the full cart and hands back refreshed view data for all dependent
//! surfaces.

use tracing::{debug, warn};

use crate::api::CafeteriaClient;
use crate::api::types::Order;
use crate::availability::ProductCard;
use crate::cart::CartStore;
use crate::checkout::CheckoutGuard;
use crate::config::ShopConfig;
use crate::error::Result;
use crate::inventory::InventoryCache;
use crate::storage::LocalStore;
use crate::views::{self, ShopView};

/// Owner of the cart, inventory snapshot, order history and product menu.
pub struct ShopApp {
    pub(crate) client: CafeteriaClient,
    pub(crate) store: LocalStore,
    pub(crate) inventory: InventoryCache,
    pub(crate) cart: CartStore,
    pub(crate) history: Vec<Order>,
    pub(crate) cards: Vec<ProductCard>,
    pub(crate) checkout_guard: CheckoutGuard,
}

impl ShopApp {
    /// Create the application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ShopConfig) -> Result<Self> {
        let client = CafeteriaClient::new(config)?;
        let store = LocalStore::new(config.data_dir.clone());
        let checkout_guard = CheckoutGuard::new(config.checkout_cooldown);

        Ok(Self {
            client,
            store,
            inventory: InventoryCache::new(),
            cart: CartStore::new(),
            history: Vec::new(),
            cards: Vec::new(),
            checkout_guard,
        })
    }

    /// Startup sequence: restore persisted cart and history for immediate
    /// display, then fetch inventory and the server order log.
    ///
    /// Network failures are logged and tolerated - the flow keeps working
    /// from the cached local state, exactly like the original page.
    pub async fn bootstrap(&mut self) {
        self.cart = CartStore::from_items(self.store.load_cart().await);
        self.history = self.store.load_history().await;
        debug!(
            cart_items = self.cart.items().len(),
            orders = self.history.len(),
            "restored local state"
        );

        if let Err(err) = self.refresh_inventory().await {
            warn!("failed to load inventory data: {err}");
        }
        self.sync_order_history().await;
    }

    /// Replace the product menu (the cards the page displays).
    pub fn set_product_cards(&mut self, cards: Vec<ProductCard>) {
        self.cards = cards;
    }

    /// Load the product menu from the data directory.
    pub async fn load_menu(&self) -> Vec<ProductCard> {
        self.store.load_menu().await
    }

    /// Re-fetch the inventory snapshot, replacing the cache wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error when the fetch fails; the previous snapshot is
    /// kept in that case.
    pub async fn refresh_inventory(&mut self) -> Result<()> {
        let items = self.client.fetch_public_items().await?;
        self.inventory.replace_all(items);
        Ok(())
    }

    /// Mirror the server order log into local history.
    ///
    /// A non-empty server log replaces the local copy (re-sorted newest
    /// first) and is re-persisted; an empty log or a fetch failure keeps
    /// the local copy.
    pub async fn sync_order_history(&mut self) {
        match self.client.fetch_order_history().await {
            Ok(orders) if !orders.is_empty() => {
                let mut orders = orders;
                orders.sort_by(|a, b| b.date.cmp(&a.date));
                self.history = orders;
                if let Err(err) = self.store.save_history(&self.history).await {
                    warn!("failed to persist order history: {err}");
                }
            }
            Ok(_) => debug!("no orders on server, keeping local history"),
            Err(err) => warn!("failed to fetch order history, keeping local copy: {err}"),
        }
    }

    /// Add one unit of a product to the cart, persist, and re-render.
    ///
    /// # Errors
    ///
    /// Cart rejections ([`crate::cart::CartError`]) and persistence
    /// failures; the in-memory cart is unchanged on rejection.
    pub async fn add_to_cart(&mut self, card: &ProductCard) -> Result<ShopView> {
        self.cart.add(
            &self.inventory,
            card.item_id,
            &card.label,
            card.price,
            &card.image,
        )?;
        self.persist_cart().await?;
        Ok(self.render())
    }

    /// Increase a cart entry by one, persist, and re-render.
    ///
    /// # Errors
    ///
    /// Cart rejections and persistence failures.
    pub async fn increment(&mut self, name: &str) -> Result<ShopView> {
        self.cart.increment(&self.inventory, name)?;
        self.persist_cart().await?;
        Ok(self.render())
    }

    /// Decrease a cart entry by one (removing it at zero), persist, and
    /// re-render.
    ///
    /// # Errors
    ///
    /// Cart rejections and persistence failures.
    pub async fn decrement(&mut self, name: &str) -> Result<ShopView> {
        self.cart.decrement(name)?;
        self.persist_cart().await?;
        Ok(self.render())
    }

    /// Remove a cart entry unconditionally, persist, and re-render.
    ///
    /// # Errors
    ///
    /// Persistence failures only.
    pub async fn remove_item(&mut self, name: &str) -> Result<ShopView> {
        self.cart.remove(name);
        self.persist_cart().await?;
        Ok(self.render())
    }

    /// Recompute every UI surface from the current state.
    #[must_use]
    pub fn render(&self) -> ShopView {
        views::render(&self.cards, &self.inventory, &self.cart, &self.history)
    }

    /// The current cart contents.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// The current inventory snapshot.
    #[must_use]
    pub fn inventory(&self) -> &InventoryCache {
        &self.inventory
    }

    /// The order history, newest first.
    #[must_use]
    pub fn history(&self) -> &[Order] {
        &self.history
    }

    pub(crate) async fn persist_cart(&self) -> Result<()> {
        self.store.save_cart(self.cart.items()).await?;
        Ok(())
    }
}
