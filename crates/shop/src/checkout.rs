//! The checkout coordinator.
//!
//! A single checkout attempt runs through a fixed sequence:
//!
//! 1. **Revalidate** - re-fetch inventory and resolve every cart line
//!    against the fresh snapshot.
//! 2. **Abort-on-conflict** - any line over available stock aborts with
//!    the offending names; the cart is left untouched.
//! 3. **Collect identity** - blank/whitespace-only student ids abort.
//! 4. **Submit** - generate a client-side order token and post the order.
//! 5. **Reconcile inventory** - push `max(0, previous - ordered)` per
//!    affected record, all updates issued concurrently and awaited
//!    together before anything else proceeds.
//! 6. **Finalize** - re-fetch inventory, prepend the order to history,
//!    persist, clear the cart, persist.
//!
//! Failures at steps 4-5 leave the cart intact; already-applied inventory
//! decrements are not rolled back (a known correctness gap of the server
//! contract). Overlapping attempts are rejected by a busy flag that stays
//! hot for a short cooldown after each network-bound attempt, so a
//! double-clicked checkout button cannot double-submit. Synchronous
//! validation rejections bypass the flag entirely.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use ezfood_core::{OrderId, Price, StudentId};
use rand::Rng;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::types::{Order, OrderLine, OrderPayload};
use crate::error::{Result, ShopError};
use crate::resolver;
use crate::state::ShopApp;

/// Outcome of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub total: Price,
    pub unit_count: u32,
}

impl CheckoutReceipt {
    /// The success notice shown to the user.
    #[must_use]
    pub fn notice(&self) -> String {
        format!(
            "Order placed successfully! Your Order ID is: {}",
            self.order_id
        )
    }
}

/// Generate a client-side order token: `CMS-` plus six random digits.
///
/// Collisions are possible and not checked; the server log is the
/// authoritative record.
#[must_use]
pub fn generate_order_id() -> OrderId {
    let digits = rand::rng().random_range(100_000..1_000_000);
    OrderId::new(format!("CMS-{digits}"))
}

/// Busy flag guarding against overlapping checkout attempts.
///
/// Mirrors the quantity-update debounce used by the management dashboard:
/// the flag is taken for the duration of the attempt and only releases
/// after a short cooldown, rejecting rapid repeat clicks.
#[derive(Debug, Clone)]
pub(crate) struct CheckoutGuard {
    state: Arc<Mutex<GuardState>>,
    cooldown: Duration,
}

#[derive(Debug, Default)]
struct GuardState {
    busy: bool,
    cooled_until: Option<Instant>,
}

impl CheckoutGuard {
    pub(crate) fn new(cooldown: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(GuardState::default())),
            cooldown,
        }
    }

    /// Take the flag, or reject when an attempt is in flight or cooling
    /// down.
    pub(crate) fn begin(&self) -> Result<CheckoutPermit> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let cooling = state
            .cooled_until
            .is_some_and(|until| Instant::now() < until);
        if state.busy || cooling {
            return Err(ShopError::CheckoutInProgress);
        }
        state.busy = true;
        Ok(CheckoutPermit {
            state: Arc::clone(&self.state),
            cooldown: self.cooldown,
        })
    }
}

/// Held for the duration of a checkout attempt; releasing starts the
/// cooldown.
pub(crate) struct CheckoutPermit {
    state: Arc<Mutex<GuardState>>,
    cooldown: Duration,
}

impl Drop for CheckoutPermit {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.busy = false;
        state.cooled_until = Some(Instant::now() + self.cooldown);
    }
}

impl ShopApp {
    /// Run one checkout attempt over the current cart.
    ///
    /// # Errors
    ///
    /// - [`ShopError::CheckoutInProgress`] when another attempt holds the
    ///   busy flag
    /// - [`ShopError::Validation`] for an empty cart or blank student id
    /// - [`ShopError::StockConflict`] when revalidation finds lines over
    ///   available stock
    /// - [`ShopError::Api`] when submission, reconciliation or the final
    ///   refresh fails
    pub async fn checkout(&mut self, student_id: &str) -> Result<CheckoutReceipt> {
        if self.cart.is_empty() {
            return Err(ShopError::Validation("Your cart is empty!".to_string()));
        }

        // The permit only guards the network-bound path; synchronous
        // validation rejections must not arm the cooldown.
        let _permit = self.checkout_guard.begin()?;

        // Steps 1-2: revalidate against fresh inventory
        self.refresh_inventory().await?;
        let conflicts: Vec<String> = self
            .cart
            .items()
            .iter()
            .filter(|line| {
                resolver::resolve_with_id(&self.inventory, line.item_id, &line.name)
                    .is_none_or(|resolution| resolution.record.quantity < line.quantity)
            })
            .map(|line| line.name.clone())
            .collect();
        if !conflicts.is_empty() {
            return Err(ShopError::StockConflict { names: conflicts });
        }

        // Step 3: identity
        let student_id = StudentId::parse(student_id).map_err(|_| {
            ShopError::Validation("Please Enter Your Student ID To Place An Order.".to_string())
        })?;

        // Step 4: submit
        let order_id = generate_order_id();
        let payload = OrderPayload {
            order_id: order_id.clone(),
            student_id: student_id.clone(),
            items: self.cart.items().iter().map(OrderLine::from).collect(),
        };
        self.client.save_order(&payload).await?;

        // Step 5: reconcile inventory. No rollback if this partially fails.
        self.reconcile_inventory().await?;

        // Step 6: finalize
        self.refresh_inventory().await?;
        let order = Order {
            order_id: order_id.clone(),
            student_id,
            date: Utc::now(),
            items: self.cart.items().to_vec(),
        };
        let receipt = CheckoutReceipt {
            order_id,
            total: order.total(),
            unit_count: order.unit_count(),
        };
        self.history.insert(0, order);
        self.store.save_history(&self.history).await?;
        self.cart.clear();
        self.store.save_cart(self.cart.items()).await?;

        info!(order_id = %receipt.order_id, "order placed successfully");
        Ok(receipt)
    }

    /// Push one authoritative quantity update per cart line, concurrently.
    ///
    /// All updates are issued before this returns; completion order across
    /// lines is unconstrained. Lines that no longer resolve are skipped
    /// with a warning (they passed revalidation, so this means the records
    /// changed under us).
    async fn reconcile_inventory(&self) -> Result<()> {
        let mut updates = Vec::new();
        for line in self.cart.items() {
            match resolver::resolve_with_id(&self.inventory, line.item_id, &line.name) {
                Some(resolution) => {
                    let record = resolution.record.clone();
                    let new_quantity = record.quantity.saturating_sub(line.quantity);
                    updates.push((record, new_quantity));
                }
                None => {
                    warn!(name = %line.name, "cannot update inventory: no match found");
                }
            }
        }

        let mut tasks = JoinSet::new();
        for (record, new_quantity) in updates {
            let client = self.client.clone();
            tasks.spawn(async move { client.update_item_quantity(&record, new_quantity).await });
        }

        while let Some(joined) = tasks.join_next().await {
            let updated = joined.map_err(|e| ShopError::Internal(e.to_string()))??;
            debug!(
                item = %updated.name,
                quantity = updated.quantity,
                "inventory reconciled"
            );
        }
        Ok(())
    }
}
