//! Cart, wishlist, and coupon commands.

use crate::catalog::{CatalogFeed, FeedClient, Product};
use crate::commands::load_catalog;
use crate::config::Config;
use crate::format::Formatter;
use crate::pricing::format_money;
use crate::store::{Store, DEFAULT_SIZE};
use anyhow::{Context, Result};
use tracing::info;

/// Cart and wishlist operations. Line numbers are 1-based as shown by
/// `cart show`.
pub struct CartCommand {
    config: Config,
}

impl CartCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Shows cart lines and totals.
    pub fn show(&self, store: &Store) -> String {
        Formatter::new(self.config.format).format_cart(
            store.cart(),
            &store.totals(),
            store.discount(),
        )
    }

    /// Adds one unit of a product in `size`.
    pub async fn add(&self, store: &mut Store, id: &str, size: &str) -> Result<String> {
        let client = FeedClient::new(&self.config).context("Failed to create HTTP client")?;
        self.add_with_client(&client, store, id, size).await
    }

    pub async fn add_with_client(
        &self,
        client: &impl CatalogFeed,
        store: &mut Store,
        id: &str,
        size: &str,
    ) -> Result<String> {
        let id = id.trim().to_lowercase();
        load_catalog(&self.config, client, store).await?;

        if !store.add_by_id(&id, size)? {
            return Ok(format!("Product not found: {}", id));
        }

        info!("Added {} ({}) to cart", id, size.trim());
        Ok(format!(
            "Added {} (size {}). Cart: {} item(s).",
            id,
            size.trim(),
            store.cart_count()
        ))
    }

    /// Adds one unit in the default size; unknown ids change nothing.
    pub async fn quick_add(&self, store: &mut Store, id: &str) -> Result<String> {
        let client = FeedClient::new(&self.config).context("Failed to create HTTP client")?;
        self.quick_add_with_client(&client, store, id).await
    }

    pub async fn quick_add_with_client(
        &self,
        client: &impl CatalogFeed,
        store: &mut Store,
        id: &str,
    ) -> Result<String> {
        let id = id.trim().to_lowercase();
        load_catalog(&self.config, client, store).await?;

        let before = store.cart_count();
        store.quick_add(&id)?;
        if store.cart_count() == before {
            return Ok(format!("Product not found: {}", id));
        }
        Ok(format!("Added {} (size {}). Cart: {} item(s).", id, DEFAULT_SIZE, store.cart_count()))
    }

    /// Changes the quantity of a cart line by `delta`.
    pub fn update_quantity(&self, store: &mut Store, line: usize, delta: i32) -> Result<String> {
        let changed = match line.checked_sub(1) {
            Some(index) => store.update_quantity(index, delta)?,
            None => false,
        };

        if !changed {
            return Ok("Quantity unchanged.".to_string());
        }
        Ok(self.show(store))
    }

    pub fn remove(&self, store: &mut Store, line: usize) -> Result<String> {
        let removed = match line.checked_sub(1) {
            Some(index) => store.remove_item(index)?,
            None => false,
        };

        if !removed {
            return Ok(format!("No cart line {}.", line));
        }
        Ok(self.show(store))
    }

    /// Applies a coupon code to the cart.
    pub fn apply_coupon(&self, store: &mut Store, code: &str) -> Result<String> {
        let fraction = store.apply_coupon(code)?;
        let totals = store.totals();
        Ok(format!(
            "Coupon applied: {:.0}% off. New total: {}",
            fraction * 100.0,
            format_money(totals.total)
        ))
    }

    /// Lists saved products.
    pub async fn wishlist(&self, store: &mut Store) -> Result<String> {
        let client = FeedClient::new(&self.config).context("Failed to create HTTP client")?;
        self.wishlist_with_client(&client, store).await
    }

    pub async fn wishlist_with_client(
        &self,
        client: &impl CatalogFeed,
        store: &mut Store,
    ) -> Result<String> {
        load_catalog(&self.config, client, store).await?;

        let products: Vec<&Product> =
            store.wishlist().iter().filter_map(|id| store.catalog().find(id)).collect();
        Ok(Formatter::new(self.config.format).format_products(&products))
    }

    /// Saves or unsaves a product id.
    pub fn toggle_wishlist(&self, store: &mut Store, id: &str) -> Result<String> {
        let id = id.trim().to_lowercase();
        let saved = store.toggle_wishlist(&id)?;
        Ok(if saved {
            format!("Saved {} to your wishlist.", id)
        } else {
            format!("Removed {} from your wishlist.", id)
        })
    }
}
