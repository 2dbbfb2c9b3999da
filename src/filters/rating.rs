//! Minimum rating filter.

use super::Filter;
use crate::catalog::Product;

/// Filters products by minimum average stars.
pub struct RatingFilter {
    min_stars: f32,
}

impl RatingFilter {
    /// Creates a rating filter; the threshold is clamped to 0-5 stars.
    pub fn new(min_stars: f32) -> Self {
        Self { min_stars: min_stars.clamp(0.0, 5.0) }
    }
}

impl Filter for RatingFilter {
    fn matches(&self, product: &Product) -> bool {
        product.rating.rate >= self.min_stars
    }

    fn description(&self) -> String {
        format!("Rating: >= {:.1} stars", self.min_stars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Rating;
    use crate::store::cart::tests::make_product;

    fn rated(rate: f32) -> Product {
        let mut product = make_product("dj-1", 10.0);
        product.rating = Rating::new(rate, 50);
        product
    }

    #[test]
    fn test_rating_filter() {
        let filter = RatingFilter::new(4.0);

        assert!(!filter.matches(&rated(3.9)));
        assert!(filter.matches(&rated(4.0)));
        assert!(filter.matches(&rated(5.0)));
    }

    #[test]
    fn test_clamping() {
        assert_eq!(RatingFilter::new(6.0).min_stars, 5.0);
        assert_eq!(RatingFilter::new(-1.0).min_stars, 0.0);
        assert!(RatingFilter::new(0.0).matches(&rated(0.0)));
    }

    #[test]
    fn test_description() {
        assert_eq!(RatingFilter::new(3.5).description(), "Rating: >= 3.5 stars");
    }
}
