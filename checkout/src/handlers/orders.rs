//! `GET /api/orders/:id`.

use crate::environment::CheckoutEnvironment;
use crate::flow;
use crate::providers::{EmailProvider, OrderStore};
use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;
use storefront_core::StoredOrder;
use storefront_web::AppError;

/// Fetch a stored order.
///
/// No authorization is applied and nothing is redacted: anyone holding the
/// id sees the whole order, e-money fields included.
///
/// # Errors
///
/// - 400 `Invalid order id` if `id` is not a UUID
/// - 404 `Order not found` if no order has this id
/// - 500 if the store cannot be read
pub async fn get_order<S, E>(
    State(env): State<Arc<CheckoutEnvironment<S, E>>>,
    Path(id): Path<String>,
) -> Result<Json<StoredOrder>, AppError>
where
    S: OrderStore + 'static,
    E: EmailProvider + 'static,
{
    flow::lookup_order(&env, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Order not found"))
}

/// Any method other than `GET` on the order route.
#[allow(clippy::unused_async)]
pub async fn lookup_method_not_allowed() -> AppError {
    AppError::method_not_allowed("GET")
}
