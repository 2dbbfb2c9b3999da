//! Keyword filtering over title, category and description.

use super::Filter;
use crate::catalog::Product;

/// Filters products by keywords.
pub struct KeywordFilter {
    /// Keywords that must all be mentioned.
    required: Vec<String>,
    /// Keywords that must not be mentioned.
    excluded: Vec<String>,
}

impl KeywordFilter {
    /// Creates a keyword filter. Matching ignores case.
    pub fn new(required: Vec<String>, excluded: Vec<String>) -> Self {
        Self {
            required: required.into_iter().map(|k| k.to_lowercase()).collect(),
            excluded: excluded.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Creates a filter with only required keywords.
    pub fn required(keywords: Vec<String>) -> Self {
        Self::new(keywords, Vec::new())
    }

    /// Creates a filter with only excluded keywords.
    pub fn excluded(keywords: Vec<String>) -> Self {
        Self::new(Vec::new(), keywords)
    }
}

impl Filter for KeywordFilter {
    fn matches(&self, product: &Product) -> bool {
        self.required.iter().all(|k| product.mentions(k))
            && !self.excluded.iter().any(|k| product.mentions(k))
    }

    fn description(&self) -> String {
        let mut parts = Vec::new();

        if !self.required.is_empty() {
            parts.push(format!("Must contain: {}", self.required.join(", ")));
        }

        if !self.excluded.is_empty() {
            parts.push(format!("Must not contain: {}", self.excluded.join(", ")));
        }

        if parts.is_empty() {
            "Keywords: any".to_string()
        } else {
            parts.join("; ")
        }
    }
}
