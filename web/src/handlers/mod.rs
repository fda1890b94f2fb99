//! HTTP request handlers shared by storefront services.

pub mod health;

pub use health::{ReadinessResponse, health_check};
