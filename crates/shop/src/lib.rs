//! EZ Food shop client library.
//!
//! Implements the customer-facing cart and checkout flow against the
//! cafeteria's REST API:
//!
//! - [`inventory`] - snapshot cache of server-held stock records
//! - [`resolver`] - matching of displayed product labels to stock records
//! - [`cart`] - the cart store and its mutation rules
//! - [`availability`] - per-product-card availability states
//! - [`checkout`] - the checkout coordinator state machine
//! - [`state`] - the [`ShopApp`](state::ShopApp) application-state object
//!   tying the pieces together
//! - [`views`] - plain display data for a rendering layer
//!
//! Business logic carries no rendering dependency; a UI subscribes to the
//! view data returned from every mutation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod availability;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod inventory;
pub mod resolver;
pub mod state;
pub mod storage;
pub mod views;

pub use error::{Result, ShopError};
pub use state::ShopApp;
