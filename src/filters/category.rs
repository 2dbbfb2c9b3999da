//! Category filter.

use super::Filter;
use crate::catalog::Product;

/// Keeps products whose category equals the given label, ignoring case.
pub struct CategoryFilter {
    category: String,
}

impl CategoryFilter {
    /// Creates a category filter for one label.
    pub fn new(category: impl Into<String>) -> Self {
        Self { category: category.into().trim().to_lowercase() }
    }
}

impl Filter for CategoryFilter {
    fn matches(&self, product: &Product) -> bool {
        product.category.to_lowercase() == self.category
    }

    fn description(&self) -> String {
        format!("Category: {}", self.category)
    }
}
