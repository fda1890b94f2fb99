//! Prometheus metrics for the checkout service.
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed, so tests and local runs need no exporter.
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront_checkout::metrics::MetricsServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//! // Scrape http://localhost:9090/metrics
//! # Ok(())
//! # }
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Orders durably created.
pub const ORDERS_CREATED: &str = "checkout_orders_created_total";
/// Submissions rejected before persistence.
pub const VALIDATION_FAILURES: &str = "checkout_validation_failures_total";
/// Submissions that failed to persist.
pub const PERSISTENCE_FAILURES: &str = "checkout_persistence_failures_total";
/// Confirmations that could not be sent for persisted orders.
pub const NOTIFICATION_FAILURES: &str = "checkout_notification_failures_total";
/// End-to-end checkout latency, labelled by `outcome`.
pub const CHECKOUT_DURATION: &str = "checkout_duration_seconds";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics server.
///
/// Serves `/metrics` on its own listener, separate from the API port.
#[derive(Debug)]
pub struct MetricsServer {
    addr: SocketAddr,
    started: bool,
}

impl MetricsServer {
    /// Create a new metrics server bound to `addr` once started.
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            started: false,
        }
    }

    /// Install the global recorder and start the HTTP listener.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if the exporter cannot be built or a recorder
    /// is already installed.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        describe_metrics();

        PrometheusBuilder::new()
            .with_http_listener(self.addr)
            .set_buckets_for_metric(
                Matcher::Full(CHECKOUT_DURATION.to_string()),
                &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?
            .install()
            .map_err(|e| MetricsError::Install(e.to_string()))?;

        self.started = true;
        tracing::info!(addr = %self.addr, "Metrics exporter listening");
        Ok(())
    }

    /// Whether [`start`](Self::start) succeeded.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }
}

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(ORDERS_CREATED, "Total number of orders persisted");
    describe_counter!(
        VALIDATION_FAILURES,
        "Total number of checkout submissions rejected as invalid"
    );
    describe_counter!(
        PERSISTENCE_FAILURES,
        "Total number of checkout submissions that failed to persist"
    );
    describe_counter!(
        NOTIFICATION_FAILURES,
        "Total number of persisted orders whose confirmation email failed"
    );
    describe_histogram!(
        CHECKOUT_DURATION,
        "Checkout handling time in seconds, from validation to acknowledgement"
    );
}

/// Checkout metrics recorder.
pub struct CheckoutMetrics;

impl CheckoutMetrics {
    /// Record a persisted order and the time taken to acknowledge it.
    pub fn record_order_created(duration: Duration) {
        counter!(ORDERS_CREATED).increment(1);
        histogram!(CHECKOUT_DURATION, "outcome" => "created").record(duration.as_secs_f64());
    }

    /// Record a rejected payload.
    pub fn record_validation_failure() {
        counter!(VALIDATION_FAILURES).increment(1);
    }

    /// Record a failed insert.
    pub fn record_persistence_failure(duration: Duration) {
        counter!(PERSISTENCE_FAILURES).increment(1);
        histogram!(CHECKOUT_DURATION, "outcome" => "persistence_failed")
            .record(duration.as_secs_f64());
    }

    /// Record a confirmation that could not be sent.
    pub fn record_notification_failure() {
        counter!(NOTIFICATION_FAILURES).increment(1);
    }
}
