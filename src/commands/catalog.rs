//! Catalog listing command implementation.

use crate::catalog::{CatalogFeed, FeedClient};
use crate::commands::load_catalog;
use crate::config::Config;
use crate::filters::{FilterChainBuilder, SortOrder};
use crate::format::Formatter;
use crate::store::Store;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Listing options from the command line.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f32>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub exclude: Vec<String>,
    pub sort: SortOrder,
    pub limit: Option<usize>,
}

/// Lists the merged catalog.
pub struct CatalogCommand {
    config: Config,
}

impl CatalogCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Loads the catalog and returns the filtered, sorted listing.
    pub async fn execute(&self, store: &mut Store, query: &CatalogQuery) -> Result<String> {
        let client = FeedClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(&client, store, query).await
    }

    /// Lists with a provided feed (for testing).
    pub async fn execute_with_client(
        &self,
        client: &impl CatalogFeed,
        store: &mut Store,
        query: &CatalogQuery,
    ) -> Result<String> {
        load_catalog(&self.config, client, store).await?;

        let filters = FilterChainBuilder::new()
            .price_range(query.min_price, query.max_price)
            .min_rating(query.min_rating)
            .category(query.category.clone())
            .keywords(query.keywords.clone())
            .exclude_keywords(query.exclude.clone())
            .build();

        if !filters.is_empty() {
            debug!("Active filters: {}", filters.descriptions().join(", "));
        }

        let catalog = store.catalog();
        let mut products = filters.apply(&catalog.products);
        query.sort.sort(&mut products);
        if let Some(limit) = query.limit {
            products.truncate(limit);
        }

        info!("Showing {} of {} products", products.len(), catalog.len());

        let mut output = Formatter::new(self.config.format).format_products(&products);
        if catalog.is_partial() {
            let failed: Vec<String> = catalog.failed_feeds().iter().map(|f| f.to_string()).collect();
            output.push_str(&format!("\n\nNote: {} feed unavailable", failed.join(", ")));
        }
        Ok(output)
    }

    /// Lists the category labels present in the catalog.
    pub async fn categories_with_client(
        &self,
        client: &impl CatalogFeed,
        store: &mut Store,
    ) -> Result<String> {
        load_catalog(&self.config, client, store).await?;
        Ok(store.catalog().categories().join("\n"))
    }

    pub async fn categories(&self, store: &mut Store) -> Result<String> {
        let client = FeedClient::new(&self.config).context("Failed to create HTTP client")?;
        self.categories_with_client(&client, store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FeedSource;
    use crate::commands::test_support::{make_test_config, memory_store, MockFeed};

    #[tokio::test]
    async fn test_catalog_lists_both_feeds() {
        let cmd = CatalogCommand::new(make_test_config());
        let mut store = memory_store();

        let output = cmd
            .execute_with_client(&MockFeed::default(), &mut store, &CatalogQuery::default())
            .await
            .unwrap();

        assert!(output.contains("fs-1"));
        assert!(output.contains("dj-1"));
        assert!(output.contains("Total: 7 products"));
        assert!(!output.contains("Note:"));
    }

    #[tokio::test]
    async fn test_catalog_filters_and_sorts() {
        let cmd = CatalogCommand::new(make_test_config());
        let mut store = memory_store();
        let query = CatalogQuery {
            max_price: Some(100.0),
            sort: SortOrder::PriceDesc,
            limit: Some(2),
            ..CatalogQuery::default()
        };

        let output =
            cmd.execute_with_client(&MockFeed::default(), &mut store, &query).await.unwrap();

        // Under $100, most expensive first: WD drive ($64), then Cotton Jacket ($55.99)
        let drive = output.find("fs-9").unwrap();
        let jacket = output.find("fs-3").unwrap();
        assert!(drive < jacket);
        assert!(!output.contains("dj-11"));
        assert!(output.contains("Total: 2 products"));
    }

    #[tokio::test]
    async fn test_catalog_by_category() {
        let cmd = CatalogCommand::new(make_test_config());
        let mut store = memory_store();
        let query =
            CatalogQuery { category: Some("men's clothing".to_string()), ..CatalogQuery::default() };

        let output =
            cmd.execute_with_client(&MockFeed::default(), &mut store, &query).await.unwrap();
        assert!(output.contains("Total: 2 products"));
    }

    #[tokio::test]
    async fn test_catalog_partial_feed_note() {
        let cmd = CatalogCommand::new(make_test_config());
        let mut store = memory_store();
        let feed = MockFeed { fail: Some(FeedSource::FakeStore) };

        let output =
            cmd.execute_with_client(&feed, &mut store, &CatalogQuery::default()).await.unwrap();
        assert!(output.contains("dj-6"));
        assert!(!output.contains("fs-1 "));
        assert!(output.contains("Note: fakestore feed unavailable"));
    }

    #[tokio::test]
    async fn test_categories() {
        let cmd = CatalogCommand::new(make_test_config());
        let mut store = memory_store();

        let output = cmd.categories_with_client(&MockFeed::default(), &mut store).await.unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec!["Beauty", "Electronics", "Fragrances", "Furniture", "Jewelery", "Men's Clothing"]
        );
    }
}
