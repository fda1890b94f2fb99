//! `GET /ready`.

use crate::environment::CheckoutEnvironment;
use crate::providers::{EmailProvider, OrderStore};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use storefront_web::handlers::ReadinessResponse;

/// Readiness: 200 when the order store answers a ping, 503 otherwise.
///
/// The mail server is not checked; an SMTP outage degrades confirmations but
/// checkout still accepts orders.
pub async fn readiness_check<S, E>(
    State(env): State<Arc<CheckoutEnvironment<S, E>>>,
) -> (StatusCode, Json<ReadinessResponse>)
where
    S: OrderStore + 'static,
    E: EmailProvider + 'static,
{
    let database = match env.orders.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            false
        }
    };

    ReadinessResponse::from_database_check(database)
}
