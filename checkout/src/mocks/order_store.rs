//! In-memory order store.

use crate::error::{CheckoutError, Result};
use crate::providers::OrderStore;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storefront_core::order_number::utc_day_bounds;
use storefront_core::{OrderId, OrderNumber, OrderPayload, OrderReceipt, StoredOrder};

#[derive(Debug, Default)]
struct State {
    orders: Vec<StoredOrder>,
    fail_creates: bool,
    fail_reads: bool,
    hide_reads: bool,
}

/// In-memory order store.
///
/// Counting the day's orders and inserting happen under one lock, so
/// concurrent creates never share an order number. Failure switches let tests
/// exercise the error paths of the checkout flow.
#[derive(Debug, Clone)]
pub struct InMemoryOrderStore {
    prefix: String,
    state: Arc<Mutex<State>>,
    create_calls: Arc<AtomicUsize>,
}

impl InMemoryOrderStore {
    /// Create an empty store that numbers orders with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            state: Arc::new(Mutex::new(State::default())),
            create_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Insert an already-numbered order, e.g. to simulate earlier orders on
    /// the same day.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Database`] if the lock is poisoned.
    pub fn seed(&self, order: StoredOrder) -> Result<()> {
        self.lock()?.orders.push(order);
        Ok(())
    }

    /// Make every `create_order` call fail.
    pub fn fail_creates(&self, fail: bool) {
        self.update(|state| state.fail_creates = fail);
    }

    /// Make every `get_order` and `ping` call fail.
    pub fn fail_reads(&self, fail: bool) {
        self.update(|state| state.fail_reads = fail);
    }

    /// Make `get_order` return `None` for stored orders, as a store with
    /// delayed read-after-write visibility would.
    pub fn hide_reads(&self, hide: bool) {
        self.update(|state| state.hide_reads = hide);
    }

    /// Number of `create_order` calls, including failed ones.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored order, in insertion order.
    #[must_use]
    pub fn orders(&self) -> Vec<StoredOrder> {
        self.lock().map(|state| state.orders.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| CheckoutError::Database("order store lock poisoned".to_string()))
    }

    fn update(&self, f: impl FnOnce(&mut State)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new(storefront_core::DEFAULT_ORDER_PREFIX)
    }
}

fn count_between(orders: &[StoredOrder], start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    orders
        .iter()
        .filter(|order| order.created_at >= start && order.created_at < end)
        .count() as u64
}

impl OrderStore for InMemoryOrderStore {
    fn create_order(
        &self,
        payload: &OrderPayload,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<OrderReceipt>> + Send {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let store = self.clone();
        let payload = payload.clone();

        async move {
            let mut state = store.lock()?;
            if state.fail_creates {
                return Err(CheckoutError::Database("simulated insert failure".to_string()));
            }

            let (start, end) = utc_day_bounds(created_at);
            let today = count_between(&state.orders, start, end);

            let receipt = OrderReceipt {
                order_id: OrderId::generate(),
                order_number: OrderNumber::generate(&store.prefix, created_at, today),
                created_at,
            };
            state.orders.push(StoredOrder::from_receipt(payload, &receipt));
            Ok(receipt)
        }
    }

    fn get_order(&self, id: OrderId) -> impl Future<Output = Result<Option<StoredOrder>>> + Send {
        let store = self.clone();

        async move {
            let state = store.lock()?;
            if state.fail_reads {
                return Err(CheckoutError::Database("simulated read failure".to_string()));
            }
            if state.hide_reads {
                return Ok(None);
            }
            Ok(state.orders.iter().find(|order| order.order_id == id).cloned())
        }
    }

    fn count_orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send {
        let store = self.clone();

        async move { Ok(count_between(&store.lock()?.orders, start, end)) }
    }

    fn ping(&self) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();

        async move {
            if store.lock()?.fail_reads {
                return Err(CheckoutError::Database("simulated read failure".to_string()));
            }
            Ok(())
        }
    }
}
