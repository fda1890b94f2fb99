//! Checkout and order lookup.
//!
//! # Checkout sequence
//!
//! 1. validate the payload (nothing is persisted on failure)
//! 2. take `created_at` from the clock, truncated to milliseconds
//! 3. persist through the [`OrderStore`], which assigns id and order number
//! 4. read the order back, or rebuild it from the payload and receipt when the
//!    store does not return it
//! 5. send the confirmation through the [`EmailProvider`]
//!
//! Once step 3 succeeds the order exists, so a failure in step 5 does not fail
//! the checkout. It is reported in [`CheckoutOutcome::confirmation`] instead.

use crate::environment::CheckoutEnvironment;
use crate::error::{CheckoutError, Result};
use crate::metrics::CheckoutMetrics;
use crate::providers::{EmailProvider, OrderStore};
use chrono::SubsecRound;
use std::time::Instant;
use storefront_core::{OrderId, OrderPayload, OrderReceipt, StoredOrder, validate_order_payload};

/// Whether the confirmation email went out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// The provider accepted the message.
    Sent,
    /// The provider failed; the order is still persisted.
    Failed {
        /// Provider error, for logs.
        reason: String,
    },
}

impl Confirmation {
    /// `true` for [`Confirmation::Sent`].
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    /// Identifier, order number and creation time.
    pub receipt: OrderReceipt,
    /// Notification result.
    pub confirmation: Confirmation,
}

/// Place an order.
///
/// # Errors
///
/// - [`CheckoutError::InvalidPayload`] if validation fails; the store is not called
/// - [`CheckoutError::Database`] if the order could not be persisted; no email is sent
pub async fn place_order<S, E>(
    env: &CheckoutEnvironment<S, E>,
    payload: OrderPayload,
) -> Result<CheckoutOutcome>
where
    S: OrderStore,
    E: EmailProvider,
{
    let started = Instant::now();

    if let Err(violations) = validate_order_payload(&payload) {
        CheckoutMetrics::record_validation_failure();
        tracing::info!(
            violations = violations.len(),
            error = %violations,
            "Checkout payload rejected"
        );
        return Err(violations.into());
    }

    let created_at = env.clock.now().trunc_subsecs(3);

    let receipt = match env.orders.create_order(&payload, created_at).await {
        Ok(receipt) => receipt,
        Err(e) => {
            CheckoutMetrics::record_persistence_failure(started.elapsed());
            tracing::error!(error = %e, "Failed to persist order");
            return Err(e);
        }
    };

    tracing::info!(
        order_id = %receipt.order_id,
        order_number = %receipt.order_number,
        items = payload.items.len(),
        payment_method = %payload.payment.method,
        "Order created"
    );

    let order = match env.orders.get_order(receipt.order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            tracing::debug!(
                order_id = %receipt.order_id,
                "Order not yet readable, confirming from submitted payload"
            );
            StoredOrder::from_receipt(payload, &receipt)
        }
        Err(e) => {
            tracing::warn!(
                order_id = %receipt.order_id,
                error = %e,
                "Failed to read back order, confirming from submitted payload"
            );
            StoredOrder::from_receipt(payload, &receipt)
        }
    };

    let confirmation = match env.email.send_order_confirmation(&order).await {
        Ok(()) => Confirmation::Sent,
        Err(e) => {
            CheckoutMetrics::record_notification_failure();
            tracing::error!(
                order_id = %receipt.order_id,
                order_number = %receipt.order_number,
                error = %e,
                "Order persisted but confirmation email failed"
            );
            Confirmation::Failed {
                reason: e.to_string(),
            }
        }
    };

    CheckoutMetrics::record_order_created(started.elapsed());

    Ok(CheckoutOutcome {
        receipt,
        confirmation,
    })
}

/// Look up an order by the id string a client supplied.
///
/// `Ok(None)` means the id is well-formed but unknown.
///
/// # Errors
///
/// - [`CheckoutError::InvalidOrderId`] if `raw_id` is not a UUID
/// - [`CheckoutError::Database`] if the store cannot be read
pub async fn lookup_order<S, E>(
    env: &CheckoutEnvironment<S, E>,
    raw_id: &str,
) -> Result<Option<StoredOrder>>
where
    S: OrderStore,
    E: EmailProvider,
{
    let id: OrderId = raw_id.parse().map_err(|_| CheckoutError::InvalidOrderId)?;

    let order = env.orders.get_order(id).await?;
    if order.is_none() {
        tracing::debug!(order_id = %id, "Order not found");
    }
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{InMemoryOrderStore, MockEmailProvider};
    use chrono::{TimeZone, Timelike, Utc};
    use std::sync::Arc;
    use storefront_testing::{FixedClock, fixtures};

    fn env_at(
        clock: FixedClock,
    ) -> CheckoutEnvironment<InMemoryOrderStore, MockEmailProvider> {
        CheckoutEnvironment::with_clock(
            InMemoryOrderStore::default(),
            MockEmailProvider::new(),
            Arc::new(clock),
        )
    }

    #[tokio::test]
    async fn test_created_at_is_truncated_to_millis() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let env = env_at(FixedClock::new(now));

        let outcome = place_order(&env, fixtures::reference_payload()).await.unwrap();

        assert_eq!(outcome.receipt.created_at.nanosecond(), 123_000_000);
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_store_or_email() {
        let env = env_at(storefront_testing::test_clock());
        let mut payload = fixtures::reference_payload();
        payload.customer.email_address = "nope".to_string();

        let err = place_order(&env, payload).await.unwrap_err();

        assert_eq!(
            err,
            CheckoutError::InvalidPayload(
                "customer.emailAddress must be a valid email address".to_string()
            )
        );
        assert_eq!(env.orders.create_calls(), 0);
        assert!(env.email.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_order_is_confirmed_from_payload() {
        let env = env_at(storefront_testing::test_clock());
        env.orders.hide_reads(true);

        let outcome = place_order(&env, fixtures::reference_payload()).await.unwrap();

        let sent = env.email.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].receipt(), outcome.receipt);
        assert_eq!(sent[0].payload, fixtures::reference_payload());
    }

    #[tokio::test]
    async fn test_read_back_failure_is_not_fatal() {
        let env = env_at(storefront_testing::test_clock());
        env.orders.fail_reads(true);

        let outcome = place_order(&env, fixtures::reference_payload()).await.unwrap();

        assert!(outcome.confirmation.is_sent());
        assert_eq!(env.orders.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_rejects_malformed_id() {
        let env = env_at(storefront_testing::test_clock());

        let err = lookup_order(&env, "not-a-uuid").await.unwrap_err();

        assert_eq!(err, CheckoutError::InvalidOrderId);
    }
}
