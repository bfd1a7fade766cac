//! Unified error handling.
//!
//! Provides a unified [`ShopError`] covering the three failure classes of
//! the flow: validation errors (no state mutated), stock-conflict errors
//! (cart left untouched), and network/server errors (operation aborted at
//! the point of failure). Every variant maps to a user-facing notice via
//! [`ShopError::notice`]. Errors are terminal to the current user action
//! only; they never corrupt cart or history state beyond the action that
//! failed.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the shop flow.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Cafeteria API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart mutation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Configuration is missing or invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// User input failed validation (missing identity, empty cart).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Revalidation found cart lines exceeding available stock.
    #[error("Out of stock: {}", names.join(", "))]
    StockConflict { names: Vec<String> },

    /// A checkout attempt is already in flight (or cooling down).
    #[error("Checkout already in progress")]
    CheckoutInProgress,

    /// Background task failed unexpectedly.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// The blocking user notice for this error, wording matching the
    /// original alerts.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Cart(CartError::OutOfStock { .. }) => {
                "Sorry, this item is out of stock.".to_string()
            }
            Self::Cart(CartError::LimitReached { available, .. }) => {
                format!("Sorry, there are only {available} of this item available.")
            }
            Self::Cart(CartError::NotInCart { name }) => {
                format!("\"{name}\" is not in your cart.")
            }
            Self::Validation(message) => message.clone(),
            Self::StockConflict { names } => format!(
                "Sorry, the following items are no longer available in the requested \
                 quantity: {}\n\nPlease update your cart and try again.",
                names.join(", ")
            ),
            Self::CheckoutInProgress => {
                "Please wait, your previous request is still being processed.".to_string()
            }
            Self::Config(err) => err.to_string(),
            Self::Api(_) | Self::Storage(_) | Self::Internal(_) => {
                format!("There was a problem with your order. Please try again: {self}")
            }
        }
    }
}

/// Result type alias for `ShopError`.
pub type Result<T> = std::result::Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_notice_reports_remaining_count() {
        let err = ShopError::from(CartError::LimitReached {
            name: "Cake".to_string(),
            available: 2,
        });
        assert_eq!(
            err.notice(),
            "Sorry, there are only 2 of this item available."
        );
    }

    #[test]
    fn conflict_notice_lists_offending_names() {
        let err = ShopError::StockConflict {
            names: vec!["Juice".to_string(), "Cake".to_string()],
        };
        assert!(err.notice().contains("Juice, Cake"));
    }

    #[test]
    fn validation_notice_passes_through() {
        let err = ShopError::Validation("Your cart is empty!".to_string());
        assert_eq!(err.notice(), "Your cart is empty!");
    }
}
