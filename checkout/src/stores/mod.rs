//! Production provider implementations backed by external services.

pub mod postgres;

pub use postgres::PostgresOrderStore;
