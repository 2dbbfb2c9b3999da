//! Cart totals: subtotal, tax, shipping, discount and grand total.
//!
//! Values stay unrounded internally; round only when presenting.

pub mod coupon;

pub use coupon::Discount;

use crate::store::cart::LineItem;
use serde::{Deserialize, Serialize};

/// Tax, shipping and threshold parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingRules {
    /// Fraction of the subtotal charged as tax
    pub tax_rate: f64,
    /// Shipping is free when the subtotal is strictly above this
    pub free_shipping_threshold: f64,
    /// Flat shipping charge otherwise
    pub shipping_cost: f64,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self { tax_rate: 0.05, free_shipping_threshold: 100.0, shipping_cost: 15.0 }
    }
}

/// Computed cart totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub discount: f64,
    pub total: f64,
}

impl Totals {
    /// Computes totals for a cart.
    ///
    /// An empty cart yields all zeros (no shipping charge). The grand total is
    /// not clamped at zero.
    pub fn compute(items: &[LineItem], discount_fraction: f64, rules: &PricingRules) -> Self {
        if items.is_empty() {
            return Self::default();
        }

        let subtotal: f64 = items.iter().map(LineItem::line_total).sum();
        let tax = subtotal * rules.tax_rate;
        let shipping =
            if subtotal > rules.free_shipping_threshold { 0.0 } else { rules.shipping_cost };
        let discount = subtotal * discount_fraction;

        Self { subtotal, tax, shipping, discount, total: subtotal + tax + shipping - discount }
    }

    /// Returns a copy with every field rounded to cents.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round2(self.subtotal),
            tax: round2(self.tax),
            shipping: round2(self.shipping),
            discount: round2(self.discount),
            total: round2(self.total),
        }
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a monetary value for display, e.g. `$126.00`.
pub fn format_money(value: f64) -> String {
    format!("${:.2}", round2(value))
}
