//! Core types for EZ Food.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod student;

pub use id::*;
pub use price::Price;
pub use student::{StudentId, StudentIdError};
