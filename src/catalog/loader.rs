//! Concurrent two-feed catalog load with an explicit failure policy.

use crate::catalog::client::CatalogFeed;
use crate::catalog::models::{FeedSource, Product};
use crate::catalog::normalize::{parse_dummy_json, parse_fake_store, Normalizer};
use crate::error::CatalogError;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How to combine the two feed outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Any feed failure fails the whole load with an empty catalog.
    Strict,
    /// Keep whatever loaded and record the failed feeds.
    #[default]
    Partial,
}

impl FromStr for LoadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(LoadPolicy::Strict),
            "partial" => Ok(LoadPolicy::Partial),
            _ => Err(format!("Unknown policy: {}. Use: strict, partial", s)),
        }
    }
}

impl fmt::Display for LoadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadPolicy::Strict => write!(f, "strict"),
            LoadPolicy::Partial => write!(f, "partial"),
        }
    }
}

/// The merged in-memory catalog for one session.
#[derive(Debug, Default)]
pub struct Catalog {
    pub products: Vec<Product>,
    /// Feeds that failed under the partial policy.
    pub failures: Vec<CatalogError>,
}

impl Catalog {
    /// Wraps an already-normalized product list.
    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products, failures: Vec::new() }
    }

    /// Looks a product up by its namespaced id.
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Distinct category labels, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.products.iter().map(|p| p.category.clone()).collect::<BTreeSet<_>>().into_iter().collect()
    }

    /// True when at least one feed is missing from this catalog.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Feeds that did not make it into this catalog.
    pub fn failed_feeds(&self) -> Vec<FeedSource> {
        self.failures.iter().filter_map(CatalogError::feed).collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Fetches and normalizes both feeds.
pub struct CatalogLoader {
    policy: LoadPolicy,
    timeout: Duration,
    seed: Option<u64>,
}

impl CatalogLoader {
    /// Creates a loader with a per-feed timeout.
    pub fn new(policy: LoadPolicy, timeout: Duration) -> Self {
        Self { policy, timeout, seed: None }
    }

    /// Seeds synthesized review data so repeated loads produce the same output.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Loads both feeds concurrently and combines them under the policy.
    pub async fn load(&self, feed: &impl CatalogFeed) -> Result<Catalog, CatalogError> {
        let (fake_store, dummy_json) = tokio::join!(
            self.fetch_one(feed, FeedSource::FakeStore),
            self.fetch_one(feed, FeedSource::DummyJson)
        );

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut normalizer = Normalizer::new(rng, Utc::now());

        let fake_store = fake_store
            .and_then(|body| parse_fake_store(&body))
            .map(|raw| normalizer.fake_store(raw));
        let dummy_json = dummy_json
            .and_then(|body| parse_dummy_json(&body))
            .map(|raw| normalizer.dummy_json(raw));

        let mut catalog = Catalog::default();
        for outcome in [fake_store, dummy_json] {
            match outcome {
                Ok(products) => catalog.products.extend(products),
                Err(e) => {
                    warn!("Catalog feed failed: {}", e);
                    if self.policy == LoadPolicy::Strict {
                        return Err(e);
                    }
                    catalog.failures.push(e);
                }
            }
        }

        if catalog.failures.len() == FeedSource::all().len() {
            return Err(CatalogError::AllFeedsFailed);
        }

        info!(
            "Loaded {} products ({} feed(s) failed)",
            catalog.products.len(),
            catalog.failures.len()
        );
        Ok(catalog)
    }

    async fn fetch_one(
        &self,
        feed: &impl CatalogFeed,
        source: FeedSource,
    ) -> Result<String, CatalogError> {
        debug!("Requesting {} feed (timeout {:?})", source, self.timeout);
        match tokio::time::timeout(self.timeout, feed.fetch(source)).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(e)) => Err(CatalogError::Fetch { feed: source, reason: format!("{:#}", e) }),
            Err(_) => Err(CatalogError::Timeout { feed: source, secs: self.timeout.as_secs() }),
        }
    }
}
