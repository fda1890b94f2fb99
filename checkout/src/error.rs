//! Error types for checkout and order lookup.

use storefront_core::ValidationErrors;
use storefront_web::AppError;
use thiserror::Error;

/// Result type alias for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Everything that can go wrong while placing or reading an order.
///
/// Client errors carry a message safe to show the caller. Dependency errors
/// carry internal detail that is logged but never sent to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    // ═══════════════════════════════════════════════════════════
    // Client Errors
    // ═══════════════════════════════════════════════════════════

    /// The payload could not be parsed or violated field constraints.
    #[error("Invalid checkout payload: {0}")]
    InvalidPayload(String),

    /// The order id is not a UUID.
    #[error("Invalid order id")]
    InvalidOrderId,

    // ═══════════════════════════════════════════════════════════
    // Dependency Errors
    // ═══════════════════════════════════════════════════════════

    /// The order store failed.
    #[error("Database error: {0}")]
    Database(String),

    /// The confirmation email could not be built or sent.
    #[error("Email error: {0}")]
    Email(String),
}

impl CheckoutError {
    /// Whether the caller caused this error.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidPayload(_) | Self::InvalidOrderId)
    }
}

impl From<ValidationErrors> for CheckoutError {
    fn from(errors: ValidationErrors) -> Self {
        Self::InvalidPayload(errors.to_string())
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::InvalidPayload(_) | CheckoutError::InvalidOrderId => {
                Self::bad_request(err.to_string())
            }
            CheckoutError::Database(_) | CheckoutError::Email(_) => {
                Self::internal("Failed to process order").with_source(err)
            }
        }
    }
}
