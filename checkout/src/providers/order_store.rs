//! Order store trait.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::future::Future;
use storefront_core::{OrderId, OrderPayload, OrderReceipt, StoredOrder};

/// Order persistence.
///
/// Orders are written once and never updated or deleted.
pub trait OrderStore: Send + Sync {
    /// Persist `payload` as a new order created at `created_at`.
    ///
    /// The store assigns the id and the order number. Counting the orders
    /// already recorded on `created_at`'s UTC day and inserting the new one
    /// must happen atomically, so concurrent calls on the same day never
    /// receive the same number.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Database`](crate::error::CheckoutError::Database)
    /// if nothing could be persisted.
    fn create_order(
        &self,
        payload: &OrderPayload,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<OrderReceipt>> + Send;

    /// Fetch an order by id. `Ok(None)` when no such order exists.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Database`](crate::error::CheckoutError::Database)
    /// if the store cannot be read.
    fn get_order(&self, id: OrderId) -> impl Future<Output = Result<Option<StoredOrder>>> + Send;

    /// Number of orders with `start <= created_at < end`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Database`](crate::error::CheckoutError::Database)
    /// if the store cannot be read.
    fn count_orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Database`](crate::error::CheckoutError::Database)
    /// if it is not.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}
