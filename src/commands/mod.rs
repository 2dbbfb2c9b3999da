//! CLI command implementations.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod product;

pub use account::AccountCommand;
pub use cart::CartCommand;
pub use catalog::{CatalogCommand, CatalogQuery};
pub use checkout::CheckoutCommand;
pub use product::ProductCommand;

use crate::catalog::{CatalogFeed, CatalogLoader};
use crate::config::Config;
use crate::store::{FileStore, Store};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Opens the persistent store under the configured data directory.
pub fn open_store(config: &Config) -> Result<Store> {
    let dir = config.data_dir();
    let kv = FileStore::open(&dir)
        .with_context(|| format!("Failed to open data directory {}", dir.display()))?;

    let mut store = Store::open(kv, config.pricing);
    store.subscribe(|event| debug!("Store event: {:?}", event));
    Ok(store)
}

/// Fetches both feeds and installs the merged catalog in the store.
pub async fn load_catalog(config: &Config, feed: &impl CatalogFeed, store: &mut Store) -> Result<()> {
    let loader = CatalogLoader::new(config.policy, Duration::from_secs(config.request_timeout_secs))
        .with_seed(config.review_seed);

    let catalog = loader.load(feed).await.context("Failed to load catalog")?;
    for failure in &catalog.failures {
        warn!("Showing partial catalog: {}", failure);
    }

    store.set_catalog(catalog);
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::catalog::FeedSource;
    use crate::catalog::LoadPolicy;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_catalog_installs_products() {
        let mut store = memory_store();
        load_catalog(&make_test_config(), &MockFeed::default(), &mut store).await.unwrap();

        assert_eq!(store.catalog().len(), 7);
        assert!(store.catalog().find("fs-3").is_some());
        assert!(store.catalog().find("dj-11").is_some());
    }

    #[tokio::test]
    async fn test_load_catalog_strict_fails() {
        let mut config = make_test_config();
        config.policy = LoadPolicy::Strict;
        let feed = MockFeed { fail: Some(FeedSource::DummyJson) };

        let mut store = memory_store();
        let err = load_catalog(&config, &feed, &mut store).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load catalog"));
        assert!(store.catalog().is_empty());
    }

    #[test]
    fn test_open_store_in_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = Config { data_dir: Some(dir.path().join("state")), ..make_test_config() };

        let mut store = open_store(&config).unwrap();
        store.toggle_wishlist("fs-1").unwrap();
        assert!(dir.path().join("state").join("wishlist.json").exists());

        let reopened = open_store(&config).unwrap();
        assert_eq!(reopened.wishlist(), &["fs-1"]);
    }
}
