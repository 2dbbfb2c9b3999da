//! zenvia - Storefront CLI over two public product feeds
//!
//! Merges two product feeds into one catalog and keeps a persistent cart,
//! wishlist, accounts and order history on disk.

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod commands;
pub mod config;
pub mod error;
pub mod filters;
pub mod format;
pub mod pricing;
pub mod store;

pub use catalog::{Catalog, FeedSource, Product, Rating};
pub use config::Config;
pub use error::{AuthError, CatalogError, CheckoutError, StoreError};
pub use pricing::{PricingRules, Totals};
pub use store::{Store, StoreEvent};
