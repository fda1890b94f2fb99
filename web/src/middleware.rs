//! Correlation ID middleware.
//!
//! Every request gets a correlation ID: the client's `X-Correlation-ID` when it
//! is a valid UUID, otherwise a new v4. The ID is
//! 1. stored in request extensions, where [`CorrelationId`](crate::CorrelationId) finds it,
//! 2. recorded on an `http_request` tracing span wrapping the handler,
//! 3. echoed in the response `X-Correlation-ID` header, including on errors.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/checkout", post(submit_checkout))
//!     .layer(correlation_id_layer());
//! ```

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Copy, Debug, Default)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

/// The valid UUID carried in `X-Correlation-ID`, if any.
#[must_use]
pub fn correlation_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id =
            correlation_id_from_headers(req.headers()).unwrap_or_else(Uuid::new_v4);
        req.extensions_mut().insert(correlation_id);

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        let fut = self.inner.call(req);

        Box::pin(
            async move {
                let mut response = fut.await?;

                // Hyphenated UUIDs are always valid header values.
                if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
                    response.headers_mut().insert(CORRELATION_ID_HEADER, value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
