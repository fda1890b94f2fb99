//! Mock email provider for testing.

use crate::error::{CheckoutError, Result};
use crate::providers::EmailProvider;
use std::future::Future;
use std::sync::{Arc, Mutex};
use storefront_core::StoredOrder;

/// Mock email provider.
///
/// Records every confirmation it is asked to send instead of delivering it.
#[derive(Debug, Clone)]
pub struct MockEmailProvider {
    /// Whether to simulate success or failure.
    pub should_succeed: bool,
    attempts: Arc<Mutex<Vec<StoredOrder>>>,
}

impl MockEmailProvider {
    /// Create a new mock email provider that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            should_succeed: true,
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock whose sends always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            should_succeed: false,
            ..Self::new()
        }
    }

    /// Orders a confirmation was attempted for, successful or not.
    #[must_use]
    pub fn attempts(&self) -> Vec<StoredOrder> {
        self.attempts
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Orders whose confirmation was "delivered".
    #[must_use]
    pub fn sent(&self) -> Vec<StoredOrder> {
        if self.should_succeed {
            self.attempts()
        } else {
            Vec::new()
        }
    }
}

impl Default for MockEmailProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailProvider for MockEmailProvider {
    fn send_order_confirmation(&self, order: &StoredOrder) -> impl Future<Output = Result<()>> + Send {
        let attempts = Arc::clone(&self.attempts);
        let should_succeed = self.should_succeed;
        let order = order.clone();

        async move {
            attempts
                .lock()
                .map_err(|_| CheckoutError::Email("mock lock poisoned".to_string()))?
                .push(order);

            if should_succeed {
                Ok(())
            } else {
                Err(CheckoutError::Email("simulated SMTP failure".to_string()))
            }
        }
    }
}
