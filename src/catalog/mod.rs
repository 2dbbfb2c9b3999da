//! Product feeds: HTTP client, raw-feed normalization and the merged catalog.

pub mod client;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod synth;

pub use client::{CatalogFeed, FeedClient};
pub use loader::{Catalog, CatalogLoader, LoadPolicy};
pub use models::{FeedSource, Product, Rating, RatingDistribution, Review};
pub use normalize::Normalizer;
