//! Catalog filtering and sorting with composable filters.

pub mod category;
pub mod keyword;
pub mod price;
pub mod rating;

use crate::catalog::Product;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub use category::CategoryFilter;
pub use keyword::KeywordFilter;
pub use price::PriceFilter;
pub use rating::RatingFilter;

/// Trait for filtering products.
pub trait Filter: Send + Sync {
    /// Returns true if the product passes the filter.
    fn matches(&self, product: &Product) -> bool;

    /// Returns a description of this filter.
    fn description(&self) -> String;
}

/// A chain of filters that must all pass.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Checks if a product passes all filters.
    pub fn matches(&self, product: &Product) -> bool {
        self.filters.iter().all(|f| f.matches(product))
    }

    /// Borrows the products that pass, keeping catalog order.
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.description()).collect()
    }
}

/// Builder for constructing a FilterChain from command options.
#[derive(Default)]
pub struct FilterChainBuilder {
    chain: FilterChain,
}

impl FilterChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        if min.is_some() || max.is_some() {
            self.chain.add(PriceFilter::new(min, max));
        }
        self
    }

    pub fn min_rating(mut self, min: Option<f32>) -> Self {
        if let Some(min) = min {
            self.chain.add(RatingFilter::new(min));
        }
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
            self.chain.add(CategoryFilter::new(category));
        }
        self
    }

    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        if !keywords.is_empty() {
            self.chain.add(KeywordFilter::required(keywords));
        }
        self
    }

    pub fn exclude_keywords(mut self, keywords: Vec<String>) -> Self {
        if !keywords.is_empty() {
            self.chain.add(KeywordFilter::excluded(keywords));
        }
        self
    }

    pub fn build(self) -> FilterChain {
        self.chain
    }
}

/// Listing order for catalog output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Catalog order: feed A first, then feed B
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    /// Highest average rating first
    Rating,
    Title,
}

impl SortOrder {
    /// Sorts in place. Stable, so ties keep catalog order.
    pub fn sort(&self, products: &mut [&Product]) {
        match self {
            SortOrder::Featured => {}
            SortOrder::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
            SortOrder::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price)),
            SortOrder::Rating => products.sort_by(|a, b| {
                b.rating
                    .rate
                    .total_cmp(&a.rating.rate)
                    .then_with(|| b.rating.count.cmp(&a.rating.count))
            }),
            SortOrder::Title => products.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        }
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "featured" => Ok(SortOrder::Featured),
            "price-asc" | "price" => Ok(SortOrder::PriceAsc),
            "price-desc" => Ok(SortOrder::PriceDesc),
            "rating" => Ok(SortOrder::Rating),
            "title" | "name" => Ok(SortOrder::Title),
            _ => Err(format!(
                "Unknown sort: {}. Use: featured, price-asc, price-desc, rating, title",
                s
            )),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Featured => write!(f, "featured"),
            SortOrder::PriceAsc => write!(f, "price-asc"),
            SortOrder::PriceDesc => write!(f, "price-desc"),
            SortOrder::Rating => write!(f, "rating"),
            SortOrder::Title => write!(f, "title"),
        }
    }
}
