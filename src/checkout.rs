//! Order submission: session and cart checks, simulated processing delay,
//! then an order snapshot and cart/discount reset.

use crate::error::CheckoutError;
use crate::pricing::format_money;
use crate::store::{LineItem, Store};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A placed order. Items are a snapshot of the cart at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub date: DateTime<Utc>,
    pub items: Vec<LineItem>,
    /// Grand total formatted for display, e.g. `$126.00`
    pub total: String,
}

impl Order {
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Non-reentrant order submitter.
#[derive(Debug)]
pub struct Checkout {
    in_flight: AtomicBool,
    delay: Duration,
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Checkout {
    pub fn new(delay: Duration) -> Self {
        Self { in_flight: AtomicBool::new(false), delay }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submits the current cart as an order.
    ///
    /// Fails without side effects when nobody is logged in, the cart is
    /// empty, or another submission is still pending. The store lock is not
    /// held during the processing delay.
    pub async fn submit(&self, store: &Mutex<Store>) -> Result<Order, CheckoutError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Rejecting checkout: submission already pending");
            return Err(CheckoutError::InProgress);
        }
        let _guard = InFlight(&self.in_flight);

        ensure_ready(&*store.lock().await)?;

        debug!("Processing order for {:?}", self.delay);
        tokio::time::sleep(self.delay).await;

        let mut store = store.lock().await;
        ensure_ready(&store)?;

        let now = Utc::now();
        let order = Order {
            id: format!("ORD-{}", now.timestamp_millis()),
            date: now,
            items: store.cart().to_vec(),
            total: format_money(store.totals().total),
        };

        store.complete_order(order.clone())?;

        info!("Placed order {} ({})", order.id, order.total);
        Ok(order)
    }
}

fn ensure_ready(store: &Store) -> Result<(), CheckoutError> {
    if !store.is_logged_in() {
        return Err(CheckoutError::NotLoggedIn);
    }
    if store.cart().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    Ok(())
}
