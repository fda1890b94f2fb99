//! HTTP handlers for the checkout API.

pub mod checkout;
pub mod health;
pub mod orders;

pub use checkout::{CheckoutResponse, checkout_method_not_allowed, submit_checkout};
pub use health::readiness_check;
pub use orders::{get_order, lookup_method_not_allowed};
