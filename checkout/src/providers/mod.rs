//! Checkout providers.
//!
//! Traits for the external dependencies of the checkout flow. The flow
//! depends only on these traits; the server binary wires in Postgres and SMTP,
//! tests wire in the in-memory versions from [`crate::mocks`].
//!
//! ```text
//! ┌──────────────────┐   create_order / get_order   ┌──────────────────┐
//! │ Checkout flow    │ ───────────────────────────► │ OrderStore       │
//! │ - validates      │                               │ (Postgres)       │
//! │ - assigns time   │   send_order_confirmation     ├──────────────────┤
//! │ - acknowledges   │ ───────────────────────────► │ EmailProvider    │
//! └──────────────────┘                               │ (SMTP)           │
//!                                                    └──────────────────┘
//! ```

pub mod email;
pub mod order_store;
pub mod smtp_email;

pub use email::EmailProvider;
pub use order_store::OrderStore;
pub use smtp_email::SmtpEmailProvider;
