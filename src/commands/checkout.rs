//! Checkout and order history commands.

use crate::checkout::Checkout;
use crate::config::Config;
use crate::format::Formatter;
use crate::store::Store;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// Places orders and lists past ones.
pub struct CheckoutCommand {
    config: Config,
}

impl CheckoutCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Submits the current cart. The store is handed back afterwards,
    /// whatever the outcome.
    pub async fn execute(&self, store: Store) -> (Store, Result<String>) {
        let checkout = Checkout::new(Duration::from_millis(self.config.checkout_delay_ms));
        let shared = Mutex::new(store);

        info!("Placing order...");
        let result = checkout.submit(&shared).await;
        let store = shared.into_inner();

        let output = result.map_err(anyhow::Error::from).map(|order| {
            format!(
                "Order {} placed: {} item(s), total {}.",
                order.id,
                order.item_count(),
                order.total
            )
        });
        (store, output)
    }

    /// Formats order history.
    pub fn orders(&self, store: &Store) -> String {
        Formatter::new(self.config.format).format_orders(store.orders())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use crate::commands::test_support::{make_test_config, memory_store};
    use crate::error::CheckoutError;
    use crate::store::cart::tests::make_product;

    fn login(store: &mut Store) {
        store
            .set_session(Some(User {
                name: "Asha".into(),
                email: "asha@example.com".into(),
                pass: String::new(),
            }))
            .unwrap();
    }

    #[tokio::test]
    async fn test_checkout_then_orders() {
        let cmd = CheckoutCommand::new(make_test_config());
        let mut store = memory_store();
        login(&mut store);
        store.add_item(&make_product("fs-1", 120.0), "M").unwrap();

        let (store, result) = cmd.execute(store).await;
        let msg = result.unwrap();
        assert!(msg.starts_with("Order ORD-"));
        assert!(msg.ends_with("1 item(s), total $126.00."));
        assert!(store.cart().is_empty());

        let history = cmd.orders(&store);
        assert!(history.contains("$126.00"));
    }

    #[tokio::test]
    async fn test_checkout_requires_login() {
        let cmd = CheckoutCommand::new(make_test_config());
        let mut store = memory_store();
        store.add_item(&make_product("fs-1", 120.0), "M").unwrap();

        let (store, result) = cmd.execute(store).await;
        let err = result.unwrap_err();
        assert!(matches!(err.downcast_ref::<CheckoutError>(), Some(CheckoutError::NotLoggedIn)));
        assert_eq!(store.cart().len(), 1);
        assert_eq!(cmd.orders(&store), "No orders yet.");
    }
}
