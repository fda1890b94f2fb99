//! Custom Axum extractors.
//!
//! - `CorrelationId`: the request's correlation ID
//!
//! # Examples
//!
//! ```ignore
//! use storefront_web::extractors::CorrelationId;
//!
//! async fn handler(correlation_id: CorrelationId) -> Result<Json<Response>, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, "Processing request");
//!     Ok(Json(response))
//! }
//! ```

use crate::middleware::CORRELATION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Resolution order:
/// 1. the ID stored by [`correlation_id_layer`](crate::middleware::correlation_id_layer)
/// 2. a valid UUID in the `X-Correlation-ID` header
/// 3. a fresh UUID v4
///
/// With the layer installed, the handler sees the same ID the response
/// header carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}
