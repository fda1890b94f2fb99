//! Checkout HTTP router.
//!
//! # Routes
//!
//! - `POST /api/checkout` - Place an order
//! - `GET /api/orders/:id` - Fetch a stored order
//! - `GET /health` - Liveness
//! - `GET /ready` - Readiness (order store ping)
//!
//! Other methods on the API routes answer 405 with an `Allow` header. Every
//! response, errors included, carries `X-Correlation-ID`.

use crate::environment::CheckoutEnvironment;
use crate::handlers;
use crate::providers::{EmailProvider, OrderStore};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use storefront_web::{AppError, correlation_id_layer};
use tower_http::trace::TraceLayer;

/// Build the checkout router over a shared environment.
///
/// # Example
///
/// ```rust,ignore
/// let env = Arc::new(CheckoutEnvironment::new(orders, email));
/// let app = checkout_router(env);
/// axum::serve(listener, app).await?;
/// ```
pub fn checkout_router<S, E>(env: Arc<CheckoutEnvironment<S, E>>) -> Router
where
    S: OrderStore + 'static,
    E: EmailProvider + 'static,
{
    let api = Router::new()
        .route(
            "/checkout",
            post(handlers::submit_checkout::<S, E>).fallback(handlers::checkout_method_not_allowed),
        )
        .route(
            "/orders/:id",
            get(handlers::get_order::<S, E>).fallback(handlers::lookup_method_not_allowed),
        );

    Router::new()
        .route("/health", get(storefront_web::handlers::health_check))
        .route("/ready", get(handlers::readiness_check::<S, E>))
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(env)
}

#[allow(clippy::unused_async)]
async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}
