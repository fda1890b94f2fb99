//! `PostgreSQL` order store.
//!
//! Orders live in one `orders` table: scalar columns for what is queried and a
//! `JSONB` column holding the submitted payload verbatim.
//!
//! # Order number assignment
//!
//! `create_order` runs in one transaction:
//!
//! 1. `pg_advisory_xact_lock(ORDER_NUMBER_LOCK_CLASS, <day>)` serializes
//!    creates for the same UTC day across every server instance
//! 2. count the day's orders
//! 3. insert with the number derived from that count
//! 4. commit, releasing the lock
//!
//! The `UNIQUE` constraint on `order_number` catches anything that bypasses
//! the lock.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use storefront_checkout::stores::PostgresOrderStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresOrderStore::connect(
//!     "postgresql://localhost/storefront",
//!     10,
//!     Duration::from_secs(30),
//!     "AUD",
//! )
//! .await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{CheckoutError, Result};
use crate::providers::OrderStore;
use chrono::{DateTime, Datelike, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use std::time::Duration;
use storefront_core::order_number::utc_day_bounds;
use storefront_core::{OrderId, OrderNumber, OrderPayload, OrderReceipt, OrderStatus, StoredOrder};
use uuid::Uuid;

/// First key of the two-key advisory lock taken while numbering an order.
/// The second key is the UTC day.
pub const ORDER_NUMBER_LOCK_CLASS: i32 = 0x0AD0_0001;

type OrderRow = (Uuid, String, String, DateTime<Utc>, Json<OrderPayload>);

/// `PostgreSQL` order store.
#[derive(Clone, Debug)]
pub struct PostgresOrderStore {
    pool: PgPool,
    prefix: String,
}

impl PostgresOrderStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool, prefix: impl Into<String>) -> Self {
        Self {
            pool,
            prefix: prefix.into(),
        }
    }

    /// Connect a new pool.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Database`] if no connection can be made.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
        prefix: impl Into<String>,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| CheckoutError::Database(format!("Failed to connect: {e}")))?;

        Ok(Self::new(pool, prefix))
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Database`] if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CheckoutError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn count_to_u64(count: i64) -> Result<u64> {
    u64::try_from(count).map_err(|_| CheckoutError::Database(format!("Negative count: {count}")))
}

fn decode_row((id, order_number, status, created_at, Json(payload)): OrderRow) -> Result<StoredOrder> {
    let order_number = OrderNumber::parse(&order_number)
        .map_err(|e| CheckoutError::Database(format!("Corrupt order row {id}: {e}")))?;
    let status: OrderStatus = status
        .parse()
        .map_err(|e| CheckoutError::Database(format!("Corrupt order row {id}: {e}")))?;

    Ok(StoredOrder {
        order_id: OrderId::from_uuid(id),
        order_number,
        created_at,
        status,
        payload,
    })
}

impl OrderStore for PostgresOrderStore {
    async fn create_order(
        &self,
        payload: &OrderPayload,
        created_at: DateTime<Utc>,
    ) -> Result<OrderReceipt> {
        let (start, end) = utc_day_bounds(created_at);
        let day_key = created_at.date_naive().num_days_from_ce();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CheckoutError::Database(format!("Failed to start transaction: {e}")))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(ORDER_NUMBER_LOCK_CLASS)
            .bind(day_key)
            .execute(&mut *tx)
            .await
            .map_err(|e| CheckoutError::Database(format!("Failed to lock order day: {e}")))?;

        let (today,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM orders
            WHERE created_at >= $1 AND created_at < $2
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| CheckoutError::Database(format!("Failed to count orders: {e}")))?;

        let receipt = OrderReceipt {
            order_id: OrderId::generate(),
            order_number: OrderNumber::generate(&self.prefix, created_at, count_to_u64(today)?),
            created_at,
        };

        sqlx::query(
            r"
            INSERT INTO orders (id, order_number, status, created_at, payload)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(receipt.order_id.as_uuid())
        .bind(receipt.order_number.as_str())
        .bind(OrderStatus::Received.as_str())
        .bind(created_at)
        .bind(Json(payload))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return CheckoutError::Database(format!(
                        "Order number {} already assigned",
                        receipt.order_number
                    ));
                }
            }
            CheckoutError::Database(format!("Failed to insert order: {e}"))
        })?;

        tx.commit()
            .await
            .map_err(|e| CheckoutError::Database(format!("Failed to commit order: {e}")))?;

        tracing::debug!(
            order_id = %receipt.order_id,
            order_number = %receipt.order_number,
            "Order inserted"
        );

        Ok(receipt)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<StoredOrder>> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT id, order_number, status, created_at, payload
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CheckoutError::Database(format!("Failed to get order: {e}")))?;

        row.map(decode_row).transpose()
    }

    async fn count_orders_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*)
            FROM orders
            WHERE created_at >= $1 AND created_at < $2
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CheckoutError::Database(format!("Failed to count orders: {e}")))?;

        count_to_u64(count)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| CheckoutError::Database(format!("Ping failed: {e}")))?;
        Ok(())
    }
}
