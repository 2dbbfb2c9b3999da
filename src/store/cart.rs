//! Cart line items and in-memory cart mutations.
//!
//! Persistence and change notification live in [`crate::store::Store`]; this
//! module only enforces the cart invariants: quantities never drop below one
//! and each `(product id, size)` key appears once.

use crate::catalog::models::Product;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// Size used when adding straight from a product listing.
pub const DEFAULT_SIZE: &str = "M";

/// One product/size/quantity entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub title: String,
    pub price: f64,
    pub category: String,
    pub image: String,
    /// Product id followed by size, kept for display and storage
    pub key: String,
    pub size: String,
    pub quantity: u32,
}

impl LineItem {
    /// Builds the uniqueness key for a product and size.
    pub fn make_key(product_id: &str, size: &str) -> String {
        format!("{}{}", product_id, size)
    }

    fn from_product(product: &Product, size: &str) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            category: product.category.clone(),
            image: product.image.clone(),
            key: Self::make_key(&product.id, size),
            size: size.to_string(),
            quantity: 1,
        }
    }

    /// Unit price times quantity, unrounded.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Ordered list of line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines (badge count).
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Adds one unit of `product` in `size`, merging with an existing line.
    pub fn add(&mut self, product: &Product, size: &str) -> Result<(), StoreError> {
        let size = size.trim();
        if size.is_empty() {
            return Err(StoreError::SizeRequired);
        }

        match self.items.iter_mut().find(|i| i.product_id == product.id && i.size == size) {
            Some(existing) => existing.quantity += 1,
            None => self.items.push(LineItem::from_product(product, size)),
        }
        Ok(())
    }

    /// Applies `delta` to the line at `index` if the result stays at one or
    /// more. Returns whether anything changed.
    pub fn update_quantity(&mut self, index: usize, delta: i32) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };

        match i64::from(item.quantity) + i64::from(delta) {
            next if next >= 1 && next != i64::from(item.quantity) => {
                item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
                true
            }
            _ => false,
        }
    }

    /// Removes the line at `index`. Returns whether anything was removed.
    pub fn remove(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.items.remove(index);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::models::{FeedSource, Rating, RatingDistribution};

    pub(crate) fn make_product(id: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            title: format!("Product {}", id),
            price,
            category: "Electronics".to_string(),
            image: format!("https://img.example/{}.jpg", id),
            rating: Rating::new(4.2, 10),
            description: "Test product".to_string(),
            reviews: Vec::new(),
            distribution: RatingDistribution::default(),
            source: FeedSource::FakeStore,
        }
    }

    pub(crate) fn make_item(id: &str, price: f64, quantity: u32) -> LineItem {
        let mut item = LineItem::from_product(&make_product(id, price), DEFAULT_SIZE);
        item.quantity = quantity;
        item
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = Cart::default();
        cart.add(&make_product("fs-1", 10.0), "L").unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].key, "fs-1L");
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_add_same_key_merges() {
        let mut cart = Cart::default();
        let product = make_product("fs-1", 10.0);
        cart.add(&product, "M").unwrap();
        cart.add(&product, "M").unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_add_other_size_is_new_line() {
        let mut cart = Cart::default();
        let product = make_product("fs-1", 10.0);
        cart.add(&product, "M").unwrap();
        cart.add(&product, "XL").unwrap();
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn test_add_colliding_key_text_stays_separate() {
        let mut cart = Cart::default();
        cart.add(&make_product("fs-1", 10.0), "1M").unwrap();
        cart.add(&make_product("fs-11", 500.0), "M").unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[1].product_id, "fs-11");
        assert_eq!(cart.items()[1].price, 500.0);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_add_requires_size() {
        let mut cart = Cart::default();
        let err = cart.add(&make_product("fs-1", 10.0), "  ").unwrap_err();
        assert!(matches!(err, StoreError::SizeRequired));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_floor_at_one() {
        let mut cart = Cart::new(vec![make_item("fs-1", 10.0, 2)]);

        assert!(cart.update_quantity(0, -1));
        assert_eq!(cart.items()[0].quantity, 1);

        // Would reach zero: ignored, line stays
        assert!(!cart.update_quantity(0, -1));
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.items().len(), 1);

        assert!(!cart.update_quantity(0, -5));
        assert_eq!(cart.items()[0].quantity, 1);

        assert!(cart.update_quantity(0, 3));
        assert_eq!(cart.items()[0].quantity, 4);
    }

    #[test]
    fn test_update_quantity_out_of_range() {
        let mut cart = Cart::new(vec![make_item("fs-1", 10.0, 1)]);
        assert!(!cart.update_quantity(3, 1));
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new(vec![make_item("fs-1", 10.0, 1), make_item("fs-2", 5.0, 1)]);
        assert!(cart.remove(0));
        assert_eq!(cart.items()[0].product_id, "fs-2");
        assert!(!cart.remove(5));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(make_item("fs-1", 12.5, 4).line_total(), 50.0);
    }

    #[test]
    fn test_cart_serializes_as_sequence() {
        let cart = Cart::new(vec![make_item("fs-1", 10.0, 1)]);
        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.starts_with('['));
        let parsed: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cart);
    }
}
