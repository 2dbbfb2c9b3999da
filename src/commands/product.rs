//! Product detail and recently viewed commands.

use crate::catalog::{CatalogFeed, FeedClient, Product};
use crate::commands::load_catalog;
use crate::config::Config;
use crate::format::Formatter;
use crate::store::Store;
use anyhow::{Context, Result};
use tracing::info;

/// Shows a single product and records it as viewed.
pub struct ProductCommand {
    config: Config,
}

impl ProductCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self, store: &mut Store, id: &str) -> Result<String> {
        let client = FeedClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(&client, store, id).await
    }

    /// Looks a product up with a provided feed (for testing).
    pub async fn execute_with_client(
        &self,
        client: &impl CatalogFeed,
        store: &mut Store,
        id: &str,
    ) -> Result<String> {
        let id = id.trim().to_lowercase();
        load_catalog(&self.config, client, store).await?;

        let Some(product) = store.catalog().find(&id).cloned() else {
            info!("Product {} not found", id);
            return Ok(format!("Product not found: {}", id));
        };

        store.view_product(&product.id)?;

        let mut output = Formatter::new(self.config.format).format_product(&product);
        if store.in_wishlist(&product.id) {
            output.push_str("\n\n(saved in your wishlist)");
        }
        Ok(output)
    }

    /// Lists recently viewed products, most recent first.
    pub async fn recent(&self, store: &mut Store) -> Result<String> {
        let client = FeedClient::new(&self.config).context("Failed to create HTTP client")?;
        self.recent_with_client(&client, store).await
    }

    pub async fn recent_with_client(
        &self,
        client: &impl CatalogFeed,
        store: &mut Store,
    ) -> Result<String> {
        load_catalog(&self.config, client, store).await?;

        // Ids from a feed that is currently down are skipped
        let products: Vec<&Product> =
            store.recently_viewed().iter().filter_map(|id| store.catalog().find(id)).collect();

        Ok(Formatter::new(self.config.format).format_products(&products))
    }
}
