//! Checkout environment.
//!
//! The dependencies every checkout operation runs against, constructed once
//! at startup and shared by all requests.

use crate::providers::{EmailProvider, OrderStore};
use std::sync::Arc;
use storefront_core::environment::{Clock, SystemClock};

/// Checkout environment.
///
/// # Type Parameters
///
/// - `S`: Order store
/// - `E`: Email provider
#[derive(Clone)]
pub struct CheckoutEnvironment<S, E>
where
    S: OrderStore,
    E: EmailProvider,
{
    /// Order store (`PostgreSQL` in production).
    pub orders: S,

    /// Email provider (SMTP in production).
    pub email: E,

    /// Source of order creation times.
    pub clock: Arc<dyn Clock>,
}

impl<S, E> CheckoutEnvironment<S, E>
where
    S: OrderStore,
    E: EmailProvider,
{
    /// Create an environment using the system clock.
    #[must_use]
    pub fn new(orders: S, email: E) -> Self {
        Self::with_clock(orders, email, Arc::new(SystemClock))
    }

    /// Create an environment with an explicit clock.
    #[must_use]
    pub fn with_clock(orders: S, email: E, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders,
            email,
            clock,
        }
    }
}
