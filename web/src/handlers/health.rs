//! Health check endpoints.
//!
//! Used by load balancers and orchestrators. Liveness never touches
//! dependencies; readiness reports whether the service's backing stores
//! answered.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Simple health check endpoint (for basic liveness).
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// Responds `200 ok` while the process can serve requests.
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,
    /// Database connectivity
    pub database: bool,
}

impl ReadinessResponse {
    /// Build the response for the outcome of a database check.
    ///
    /// 200 when the database answered, 503 otherwise.
    #[must_use]
    pub fn from_database_check(database: bool) -> (StatusCode, Json<Self>) {
        let status = if database {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        (
            status,
            Json(Self {
                ready: database,
                database,
            }),
        )
    }
}
