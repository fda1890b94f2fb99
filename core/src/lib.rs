//! # Storefront Core
//!
//! Domain types and pure logic for the storefront checkout.
//!
//! This crate has no I/O. Everything that talks to a database, a mail server or
//! the network lives in `storefront-checkout` and is injected through traits,
//! so the logic here is testable at memory speed.
//!
//! ## Contents
//!
//! - [`order`]: the order payload submitted by a customer and the stored order
//! - [`order_number`]: `<PREFIX>-<YYYYMMDD>-<NNNN>` order number generation
//! - [`validation`]: field-level checks run before anything is persisted
//! - [`environment`]: the [`Clock`](environment::Clock) dependency
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use storefront_core::order_number::OrderNumber;
//!
//! let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
//! let number = OrderNumber::generate("AUD", created_at, 3);
//! assert_eq!(number.as_str(), "AUD-20240301-0004");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod order;
pub mod order_number;
pub mod validation;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use order::{
    CartItem, CustomerDetails, OrderId, OrderPayload, OrderReceipt, OrderStatus, OrderTotals,
    PaymentDetails, PaymentMethod, ShippingDetails, StoredOrder,
};
pub use order_number::{OrderNumber, OrderNumberError, DEFAULT_ORDER_PREFIX};
pub use validation::{validate_order_payload, ValidationErrors};

/// Environment module - Dependency injection traits
///
/// External dependencies that the checkout flow needs but must not construct
/// itself. Only time lives here; storage and mail are traits in
/// `storefront-checkout` because they carry I/O error types.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    ///
    /// // Test - fixed time for deterministic order numbers
    /// let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(created_at));
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time from the operating system.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::environment::{Clock, SystemClock};

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
