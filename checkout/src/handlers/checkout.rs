//! `POST /api/checkout`.

use crate::environment::CheckoutEnvironment;
use crate::error::CheckoutError;
use crate::flow::{self, CheckoutOutcome};
use crate::metrics::CheckoutMetrics;
use crate::providers::{EmailProvider, OrderStore};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::{OrderId, OrderNumber, OrderPayload};
use storefront_web::{AppError, CorrelationId};

/// Acknowledgement of a placed order.
///
/// `confirmationSent` is `false` when the order was persisted but the
/// confirmation email failed; the order is still valid and retrievable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Order identifier, for lookups.
    pub order_id: OrderId,
    /// Human-readable order number.
    pub order_number: OrderNumber,
    /// Creation time (UTC, millisecond precision).
    #[serde(with = "storefront_core::order::timestamp_millis")]
    pub created_at: DateTime<Utc>,
    /// Whether the confirmation email was sent.
    pub confirmation_sent: bool,
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self {
            order_id: outcome.receipt.order_id,
            order_number: outcome.receipt.order_number,
            created_at: outcome.receipt.created_at,
            confirmation_sent: outcome.confirmation.is_sent(),
        }
    }
}

/// Place an order.
///
/// # Errors
///
/// - 400 if the body is not a valid checkout payload
/// - 500 if the order could not be persisted
pub async fn submit_checkout<S, E>(
    State(env): State<Arc<CheckoutEnvironment<S, E>>>,
    correlation_id: CorrelationId,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, AppError>
where
    S: OrderStore + 'static,
    E: EmailProvider + 'static,
{
    let Json(payload) = payload.map_err(|rejection| {
        CheckoutMetrics::record_validation_failure();
        tracing::info!(
            correlation_id = %correlation_id.0,
            error = %rejection.body_text(),
            "Unparseable checkout payload"
        );
        CheckoutError::InvalidPayload(rejection.body_text())
    })?;

    let outcome = flow::place_order(&env, payload).await?;

    tracing::info!(
        correlation_id = %correlation_id.0,
        order_number = %outcome.receipt.order_number,
        confirmation_sent = outcome.confirmation.is_sent(),
        "Checkout accepted"
    );

    Ok(Json(outcome.into()))
}

/// Any method other than `POST` on the checkout route.
///
/// # Errors
///
/// Always 405 with `Allow: POST`.
#[allow(clippy::unused_async)]
pub async fn checkout_method_not_allowed() -> AppError {
    AppError::method_not_allowed("POST")
}
