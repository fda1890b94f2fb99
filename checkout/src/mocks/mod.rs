//! In-memory provider implementations for testing and local development.

pub mod email;
pub mod order_store;

pub use email::MockEmailProvider;
pub use order_store::InMemoryOrderStore;
