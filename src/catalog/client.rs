//! HTTP client for the product feeds using wreq for browser emulation.

use crate::catalog::models::FeedSource;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Trait for fetching raw feed bodies - enables mocking for tests.
#[async_trait]
pub trait CatalogFeed: Send + Sync {
    /// Fetches the raw JSON body of one feed.
    async fn fetch(&self, feed: FeedSource) -> Result<String>;
}

/// Feed HTTP client.
pub struct FeedClient {
    client: Client,
    fake_store_url: String,
    dummy_json_url: String,
}

impl FeedClient {
    /// Creates a client for the feed URLs in the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            fake_store_url: config.fake_store_url.clone(),
            dummy_json_url: config.dummy_json_url.clone(),
        })
    }

    /// Returns the endpoint for a feed.
    fn url(&self, feed: FeedSource) -> &str {
        match feed {
            FeedSource::FakeStore => &self.fake_store_url,
            FeedSource::DummyJson => &self.dummy_json_url,
        }
    }
}

#[async_trait]
impl CatalogFeed for FeedClient {
    async fn fetch(&self, feed: FeedSource) -> Result<String> {
        let url = self.url(feed);
        info!("Fetching {} feed", feed);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "application/json")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 429 {
            warn!("{} feed is rate limiting requests", feed);
            anyhow::bail!("Rate limited by {} feed", feed);
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}
