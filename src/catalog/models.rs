//! Unified product model shared by both feeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which external feed a product came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    /// Flat array feed (`fs-` ids).
    FakeStore,
    /// Wrapped `{ products: [...] }` feed (`dj-` ids).
    DummyJson,
}

impl FeedSource {
    /// Returns the id prefix used to namespace this feed's products.
    pub fn prefix(&self) -> &'static str {
        match self {
            FeedSource::FakeStore => "fs-",
            FeedSource::DummyJson => "dj-",
        }
    }

    /// Returns both feeds in load order.
    pub fn all() -> &'static [FeedSource] {
        &[FeedSource::FakeStore, FeedSource::DummyJson]
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::FakeStore => write!(f, "fakestore"),
            FeedSource::DummyJson => write!(f, "dummyjson"),
        }
    }
}

impl FromStr for FeedSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fakestore" | "fs" => Ok(FeedSource::FakeStore),
            "dummyjson" | "dj" => Ok(FeedSource::DummyJson),
            _ => Err(format!("Unknown feed: {}. Use: fakestore, dummyjson", s)),
        }
    }
}

/// Average rating and number of ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average stars (0.0 - 5.0)
    pub rate: f32,
    /// Number of ratings
    pub count: u32,
}

impl Rating {
    /// Creates a new rating, clamping the average into range.
    pub fn new(rate: f32, count: u32) -> Self {
        Self { rate: rate.clamp(0.0, 5.0), count }
    }
}

/// A single customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer: String,
    /// Stars given (1-5)
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// Per-star rating counts.
///
/// Decorative only: synthesized from the average and total count, not real
/// vote data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDistribution {
    /// Index 0 holds 1-star counts, index 4 holds 5-star counts.
    pub buckets: [u32; 5],
}

impl RatingDistribution {
    /// Returns the count for a star value (1-5). Out-of-range stars yield 0.
    pub fn count(&self, stars: u8) -> u32 {
        match stars {
            1..=5 => self.buckets.get(usize::from(stars) - 1).copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// Sum across all buckets.
    pub fn total(&self) -> u32 {
        self.buckets.iter().sum()
    }

    /// Share of the total for a star value, as a percentage.
    pub fn percent(&self, stars: u8) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.count(stars)) / f64::from(total) * 100.0
    }
}

/// A product normalized from either feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Feed-namespaced identifier (`fs-1`, `dj-42`)
    pub id: String,
    pub title: String,
    pub price: f64,
    /// Title-cased category label
    pub category: String,
    pub image: String,
    pub rating: Rating,
    pub description: String,
    pub reviews: Vec<Review>,
    pub distribution: RatingDistribution,
    pub source: FeedSource,
}

impl Product {
    /// Returns true if the title, category or description contains `needle`
    /// (case-insensitive).
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_prefix() {
        assert_eq!(FeedSource::FakeStore.prefix(), "fs-");
        assert_eq!(FeedSource::DummyJson.prefix(), "dj-");
        assert_eq!(FeedSource::all().len(), 2);
    }

    #[test]
    fn test_feed_parsing() {
        assert_eq!("fakestore".parse::<FeedSource>().unwrap(), FeedSource::FakeStore);
        assert_eq!("DJ".parse::<FeedSource>().unwrap(), FeedSource::DummyJson);

        let err = "walmart".parse::<FeedSource>().unwrap_err();
        assert!(err.contains("Unknown feed"));
    }

    #[test]
    fn test_feed_display() {
        assert_eq!(FeedSource::FakeStore.to_string(), "fakestore");
        assert_eq!(FeedSource::DummyJson.to_string(), "dummyjson");
    }

    #[test]
    fn test_rating_clamping() {
        assert_eq!(Rating::new(7.2, 3).rate, 5.0);
        assert_eq!(Rating::new(-1.0, 3).rate, 0.0);
        assert_eq!(Rating::new(3.9, 120).count, 120);
    }

    #[test]
    fn test_distribution_lookup() {
        let dist = RatingDistribution { buckets: [1, 2, 3, 4, 10] };
        assert_eq!(dist.count(5), 10);
        assert_eq!(dist.count(1), 1);
        assert_eq!(dist.count(0), 0);
        assert_eq!(dist.count(6), 0);
        assert_eq!(dist.total(), 20);
        assert!((dist.percent(5) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distribution_percent_empty() {
        assert_eq!(RatingDistribution::default().percent(5), 0.0);
    }

    #[test]
    fn test_feed_serde() {
        let json = serde_json::to_string(&FeedSource::DummyJson).unwrap();
        assert_eq!(json, "\"dummyjson\"");
    }
}
