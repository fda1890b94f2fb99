//! # Storefront Checkout
//!
//! The checkout service: accepts a customer's order, persists it with a
//! per-day order number, emails a confirmation and serves the order back by
//! id.
//!
//! ## Architecture
//!
//! ```text
//! HTTP (router, handlers)
//!     │
//!     ▼
//! flow::place_order / flow::lookup_order
//!     │
//!     ▼
//! CheckoutEnvironment ── OrderStore ───── PostgresOrderStore | InMemoryOrderStore
//!                     ├─ EmailProvider ── SmtpEmailProvider  | MockEmailProvider
//!                     └─ Clock
//! ```
//!
//! The flow only sees the traits, so the same code runs against `PostgreSQL`
//! and SMTP in production and against the in-memory mocks in tests.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use storefront_checkout::{CheckoutEnvironment, checkout_router};
//! use storefront_checkout::mocks::{InMemoryOrderStore, MockEmailProvider};
//!
//! let env = CheckoutEnvironment::new(InMemoryOrderStore::default(), MockEmailProvider::new());
//! let app = checkout_router(Arc::new(env));
//! # let _ = app;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod email_template;
pub mod environment;
pub mod error;
pub mod flow;
pub mod handlers;
pub mod metrics;
pub mod providers;
pub mod router;
pub mod stores;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use config::Config;
pub use environment::CheckoutEnvironment;
pub use error::{CheckoutError, Result};
pub use flow::{Confirmation, CheckoutOutcome, lookup_order, place_order};
pub use providers::{EmailProvider, OrderStore, SmtpEmailProvider};
pub use router::checkout_router;
pub use stores::PostgresOrderStore;
