//! Axum building blocks shared by storefront HTTP services.
//!
//! Services keep their domain logic in plain async functions over injected
//! providers and use this crate for the HTTP edge:
//!
//! - [`AppError`]: status, code and message mapping with `{code, message}` bodies
//! - [`correlation_id_layer`] and [`CorrelationId`]: per-request IDs echoed in
//!   `X-Correlation-ID` and recorded on the request span
//! - [`handlers::health`]: liveness and readiness responses
//!
//! # Request Flow
//!
//! 1. **HTTP Request** passes the correlation and trace layers
//! 2. **Extract** JSON bodies, path parameters and the correlation ID
//! 3. **Run** the domain operation against the service environment
//! 4. **Map** the domain result or error to a response
//!
//! # Example
//!
//! ```ignore
//! use storefront_web::{AppError, CorrelationId, correlation_id_layer};
//! use axum::{Router, routing::post, Json};
//!
//! async fn submit(
//!     correlation_id: CorrelationId,
//!     Json(request): Json<CheckoutRequest>,
//! ) -> Result<Json<CheckoutResponse>, AppError> {
//!     let outcome = place_order(&env, request).await?;
//!     Ok(Json(outcome.into()))
//! }
//!
//! let app = Router::new()
//!     .route("/api/checkout", post(submit))
//!     .layer(correlation_id_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_from_headers, correlation_id_layer};
