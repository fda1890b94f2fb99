//! Email provider trait.

use crate::error::Result;
use std::future::Future;
use storefront_core::StoredOrder;

/// Email provider.
///
/// Abstracts over the mail transport (SMTP relay, transactional API, ...).
/// Delivery is fire-and-report: success or failure, no receipts.
pub trait EmailProvider: Send + Sync {
    /// Send the order confirmation to the customer's email address.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Email`](crate::error::CheckoutError::Email) if:
    /// - the message cannot be built (e.g. unparseable recipient)
    /// - the server rejects it or cannot be reached
    fn send_order_confirmation(&self, order: &StoredOrder)
    -> impl Future<Output = Result<()>> + Send;
}
