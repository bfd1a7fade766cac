//! EZ Food Core - Shared types library.
//!
//! This crate provides common types used across the EZ Food client
//! components:
//! - `shop` - Customer-facing cart and checkout flow
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and student
//!   identifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
