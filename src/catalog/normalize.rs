//! Normalization of the two raw feed shapes into [`Product`].
//!
//! Feed A is a flat array with a nested `{rate, count}` rating; feed B wraps
//! its array in `{ products: [...] }`, has a bare numeric rating and may carry
//! its own reviews. Missing reviews and all rating distributions are filled
//! in by [`crate::catalog::synth`].

use crate::catalog::models::{FeedSource, Product, Rating, Review};
use crate::catalog::synth::{rating_distribution, synthesize_reviews};
use crate::error::CatalogError;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, trace};

/// Feed B does not report how many ratings back its average.
pub const DUMMYJSON_RATING_COUNT: u32 = 50;

/// Raw product from the flat-array feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FakeStoreProduct {
    pub id: u64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: FakeStoreRating,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct FakeStoreRating {
    #[serde(default)]
    pub rate: f32,
    #[serde(default)]
    pub count: u32,
}

/// Raw wrapped response from the second feed.
#[derive(Debug, Clone, Deserialize)]
pub struct DummyJsonResponse {
    pub products: Vec<DummyJsonProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DummyJsonProduct {
    pub id: u64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reviews: Option<Vec<DummyJsonReview>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DummyJsonReview {
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub reviewer_name: String,
}

/// Parses the flat-array feed body.
pub fn parse_fake_store(body: &str) -> Result<Vec<FakeStoreProduct>, CatalogError> {
    serde_json::from_str(body)
        .map_err(|source| CatalogError::Deserialize { feed: FeedSource::FakeStore, source })
}

/// Parses the wrapped feed body.
pub fn parse_dummy_json(body: &str) -> Result<DummyJsonResponse, CatalogError> {
    serde_json::from_str(body)
        .map_err(|source| CatalogError::Deserialize { feed: FeedSource::DummyJson, source })
}

/// Title-cases a category slug: `mens-clothing` -> `Mens Clothing`.
pub fn title_case(label: &str) -> String {
    label
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Converts raw feed records into unified products.
///
/// Generic over the random source so tests can seed it.
pub struct Normalizer<R> {
    rng: R,
    now: DateTime<Utc>,
}

impl<R: Rng> Normalizer<R> {
    /// Creates a normalizer that backdates synthesized reviews from `now`.
    pub fn new(rng: R, now: DateTime<Utc>) -> Self {
        Self { rng, now }
    }

    /// Maps the flat-array feed.
    pub fn fake_store(&mut self, items: Vec<FakeStoreProduct>) -> Vec<Product> {
        let products: Vec<Product> = items
            .into_iter()
            .map(|item| {
                let rating = Rating::new(item.rating.rate, item.rating.count);
                trace!("Normalizing fakestore product {}", item.id);
                Product {
                    id: format!("{}{}", FeedSource::FakeStore.prefix(), item.id),
                    title: item.title,
                    price: item.price.max(0.0),
                    category: title_case(&item.category),
                    image: item.image,
                    rating,
                    description: item.description,
                    reviews: synthesize_reviews(&mut self.rng, self.now),
                    distribution: rating_distribution(rating.rate, rating.count),
                    source: FeedSource::FakeStore,
                }
            })
            .collect();

        debug!("Normalized {} fakestore products", products.len());
        products
    }

    /// Maps the wrapped feed.
    pub fn dummy_json(&mut self, response: DummyJsonResponse) -> Vec<Product> {
        let products: Vec<Product> = response
            .products
            .into_iter()
            .map(|item| {
                let rating = Rating::new(item.rating, DUMMYJSON_RATING_COUNT);
                let reviews = match item.reviews {
                    Some(reviews) if !reviews.is_empty() => convert_reviews(reviews, self.now),
                    _ => synthesize_reviews(&mut self.rng, self.now),
                };
                Product {
                    id: format!("{}{}", FeedSource::DummyJson.prefix(), item.id),
                    title: item.title,
                    price: item.price.max(0.0),
                    category: title_case(&item.category),
                    image: item.thumbnail,
                    rating,
                    description: item.description,
                    reviews,
                    distribution: rating_distribution(rating.rate, rating.count),
                    source: FeedSource::DummyJson,
                }
            })
            .collect();

        debug!("Normalized {} dummyjson products", products.len());
        products
    }
}

fn convert_reviews(raw: Vec<DummyJsonReview>, now: DateTime<Utc>) -> Vec<Review> {
    raw.into_iter()
        .map(|review| Review {
            reviewer: review.reviewer_name,
            rating: review.rating.clamp(1, 5),
            comment: review.comment,
            date: review
                .date
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or(now),
        })
        .collect()
}
