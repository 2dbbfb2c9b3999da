//! Coupon codes and the currently applied discount.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Static coupon table: code -> discount fraction.
pub const COUPONS: &[(&str, f64)] = &[("ZENVIA10", 0.10), ("WELCOME20", 0.20)];

/// Looks a code up after trimming and uppercasing it.
pub fn lookup(code: &str) -> Option<(&'static str, f64)> {
    let normalized = code.trim().to_uppercase();
    COUPONS.iter().find(|(c, _)| *c == normalized).copied()
}

/// The active discount. Fraction is always zero or a value from [`COUPONS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub code: Option<String>,
    pub fraction: f64,
}

impl Discount {
    /// Applies a coupon code.
    ///
    /// An unknown code fails and leaves the current discount in place.
    pub fn apply(&mut self, code: &str) -> Result<f64, StoreError> {
        let (matched, fraction) =
            lookup(code).ok_or_else(|| StoreError::InvalidCoupon(code.trim().to_string()))?;

        debug!("Applied coupon {} ({}%)", matched, fraction * 100.0);
        self.code = Some(matched.to_string());
        self.fraction = fraction;
        Ok(fraction)
    }

    /// Clears the discount.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.code.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_code() {
        let mut discount = Discount::default();
        assert_eq!(discount.apply("ZENVIA10").unwrap(), 0.10);
        assert_eq!(discount.fraction, 0.10);
        assert_eq!(discount.code.as_deref(), Some("ZENVIA10"));
        assert!(discount.is_active());
    }

    #[test]
    fn test_apply_normalizes_code() {
        let mut discount = Discount::default();
        discount.apply("  welcome20 ").unwrap();
        assert_eq!(discount.fraction, 0.20);
        assert_eq!(discount.code.as_deref(), Some("WELCOME20"));
    }

    #[test]
    fn test_unknown_code_keeps_previous() {
        let mut discount = Discount::default();
        discount.apply("ZENVIA10").unwrap();

        let err = discount.apply("BOGUS").unwrap_err();
        assert!(matches!(err, StoreError::InvalidCoupon(ref c) if c == "BOGUS"));
        assert_eq!(discount.fraction, 0.10);
        assert_eq!(discount.code.as_deref(), Some("ZENVIA10"));
    }

    #[test]
    fn test_new_code_overwrites() {
        let mut discount = Discount::default();
        discount.apply("ZENVIA10").unwrap();
        discount.apply("WELCOME20").unwrap();
        assert_eq!(discount.fraction, 0.20);
    }

    #[test]
    fn test_reset() {
        let mut discount = Discount::default();
        discount.apply("WELCOME20").unwrap();
        discount.reset();
        assert_eq!(discount, Discount::default());
        assert!(!discount.is_active());
    }

    #[test]
    fn test_table_fractions_in_range() {
        assert!(COUPONS.iter().all(|(_, f)| *f > 0.0 && *f <= 1.0));
        assert!(lookup("nope").is_none());
    }
}
