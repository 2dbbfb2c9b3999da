//! Storefront state: cart, wishlist, discount, session and history.
//!
//! [`Store`] is the single owner of mutable session state. Each mutating
//! method writes the new value through the [`KeyValueStore`] port, swaps it
//! in only once the write succeeded, then notifies subscribers.

pub mod cart;
pub mod persist;

pub use cart::{Cart, LineItem, DEFAULT_SIZE};
pub use persist::{FileStore, KeyValueStore, MemoryStore};

use crate::auth::{Challenge, User};
use crate::catalog::{Catalog, Product};
use crate::checkout::Order;
use crate::error::StoreError;
use crate::pricing::{Discount, PricingRules, Totals};
use persist::{keys, load_json, save_json};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Recently viewed list is capped at this many ids.
pub const RECENTLY_VIEWED_LIMIT: usize = 6;

/// Display theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Unknown theme: {}. Use: light, dark", s)),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Change notifications emitted after successful mutations.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    CartChanged { count: u32 },
    WishlistChanged { count: usize },
    DiscountChanged { fraction: f64 },
    SessionChanged { logged_in: bool },
    RecentlyViewedChanged,
    ThemeChanged(Theme),
    OrderPlaced { id: String },
}

type Subscriber = Box<dyn Fn(&StoreEvent) + Send>;

/// Owner of all storefront state for one session.
pub struct Store {
    kv: Box<dyn KeyValueStore>,
    rules: PricingRules,
    catalog: Catalog,
    cart: Cart,
    wishlist: Vec<String>,
    discount: Discount,
    session: Option<User>,
    users: Vec<User>,
    recently_viewed: Vec<String>,
    theme: Theme,
    orders: Vec<Order>,
    subscribers: Vec<Subscriber>,
}

impl Store {
    /// Restores persisted state from `kv`. Missing or corrupt values start
    /// empty.
    pub fn open(kv: impl KeyValueStore + 'static, rules: PricingRules) -> Self {
        let cart: Cart = load_json(&kv, keys::CART).unwrap_or_default();
        let wishlist: Vec<String> = load_json(&kv, keys::WISHLIST).unwrap_or_default();
        let discount: Discount = load_json(&kv, keys::DISCOUNT).unwrap_or_default();
        let session: Option<User> = load_json(&kv, keys::SESSION);
        let users: Vec<User> = load_json(&kv, keys::USERS).unwrap_or_default();
        let recently_viewed: Vec<String> =
            load_json(&kv, keys::RECENTLY_VIEWED).unwrap_or_default();
        let theme: Theme = load_json(&kv, keys::THEME).unwrap_or_default();
        let orders: Vec<Order> = load_json(&kv, keys::ORDERS).unwrap_or_default();

        debug!(
            "Restored store: {} cart lines, {} wishlist ids, {} orders",
            cart.items().len(),
            wishlist.len(),
            orders.len()
        );

        Self {
            kv: Box::new(kv),
            rules,
            catalog: Catalog::default(),
            cart,
            wishlist,
            discount,
            session,
            users,
            recently_viewed,
            theme,
            orders,
            subscribers: Vec::new(),
        }
    }

    /// Registers a callback invoked after every successful mutation.
    pub fn subscribe(&mut self, subscriber: impl Fn(&StoreEvent) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    fn notify(&self, event: StoreEvent) {
        for subscriber in &self.subscribers {
            subscriber(&event);
        }
    }

    fn persist<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        save_json(self.kv.as_mut(), key, value)
    }

    // Catalog

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    // Cart

    pub fn cart(&self) -> &[LineItem] {
        self.cart.items()
    }

    pub fn cart_count(&self) -> u32 {
        self.cart.count()
    }

    /// Adds one unit of `product` in `size` and returns the updated cart.
    pub fn add_item(&mut self, product: &Product, size: &str) -> Result<&[LineItem], StoreError> {
        let mut cart = self.cart.clone();
        cart.add(product, size)?;
        self.commit_cart(cart)?;
        Ok(self.cart.items())
    }

    /// Adds a catalog product by id. Returns false if the id is unknown.
    pub fn add_by_id(&mut self, product_id: &str, size: &str) -> Result<bool, StoreError> {
        let Some(product) = self.catalog.find(product_id) else {
            debug!("Product {} not in catalog", product_id);
            return Ok(false);
        };
        let mut cart = self.cart.clone();
        cart.add(product, size)?;
        self.commit_cart(cart)?;
        Ok(true)
    }

    /// Adds a catalog product in the default size; unknown ids are ignored.
    pub fn quick_add(&mut self, product_id: &str) -> Result<(), StoreError> {
        self.add_by_id(product_id, DEFAULT_SIZE).map(|_| ())
    }

    /// Changes a line's quantity by `delta` unless that would take it below
    /// one. Returns whether the cart changed.
    pub fn update_quantity(&mut self, index: usize, delta: i32) -> Result<bool, StoreError> {
        let mut cart = self.cart.clone();
        if !cart.update_quantity(index, delta) {
            debug!("Ignoring quantity change {} on line {}", delta, index);
            return Ok(false);
        }
        self.commit_cart(cart)?;
        Ok(true)
    }

    /// Removes the line at `index`; out-of-range is a no-op.
    pub fn remove_item(&mut self, index: usize) -> Result<bool, StoreError> {
        let mut cart = self.cart.clone();
        if !cart.remove(index) {
            return Ok(false);
        }
        self.commit_cart(cart)?;
        Ok(true)
    }

    pub fn clear_cart(&mut self) -> Result<(), StoreError> {
        self.commit_cart(Cart::default())
    }

    /// Persists `cart` and only then makes it current.
    fn commit_cart(&mut self, cart: Cart) -> Result<(), StoreError> {
        self.persist(keys::CART, &cart)?;
        let count = cart.count();
        self.cart = cart;
        self.notify(StoreEvent::CartChanged { count });
        Ok(())
    }

    // Wishlist

    pub fn wishlist(&self) -> &[String] {
        &self.wishlist
    }

    /// Badge count for the wishlist.
    pub fn wishlist_count(&self) -> usize {
        self.wishlist.len()
    }

    pub fn in_wishlist(&self, product_id: &str) -> bool {
        self.wishlist.iter().any(|id| id == product_id)
    }

    /// Adds the id if absent, removes it if present. Returns whether the id
    /// is now saved.
    pub fn toggle_wishlist(&mut self, product_id: &str) -> Result<bool, StoreError> {
        let mut wishlist = self.wishlist.clone();
        let saved = match wishlist.iter().position(|id| id == product_id) {
            Some(pos) => {
                wishlist.remove(pos);
                false
            }
            None => {
                wishlist.push(product_id.to_string());
                true
            }
        };

        self.persist(keys::WISHLIST, &wishlist)?;
        self.wishlist = wishlist;
        self.notify(StoreEvent::WishlistChanged { count: self.wishlist_count() });
        Ok(saved)
    }

    // Discount

    pub fn discount(&self) -> &Discount {
        &self.discount
    }

    /// Applies a coupon. Unknown codes fail without touching the current
    /// discount.
    pub fn apply_coupon(&mut self, code: &str) -> Result<f64, StoreError> {
        let mut discount = self.discount.clone();
        let fraction = discount.apply(code)?;
        self.persist(keys::DISCOUNT, &discount)?;
        self.discount = discount;
        self.notify(StoreEvent::DiscountChanged { fraction });
        Ok(fraction)
    }

    pub fn reset_discount(&mut self) -> Result<(), StoreError> {
        self.kv.remove(keys::DISCOUNT)?;
        self.discount.reset();
        self.notify(StoreEvent::DiscountChanged { fraction: 0.0 });
        Ok(())
    }

    /// Totals for the current cart and discount, unrounded.
    pub fn totals(&self) -> Totals {
        Totals::compute(self.cart.items(), self.discount.fraction, &self.rules)
    }

    // Browsing history and preferences

    pub fn recently_viewed(&self) -> &[String] {
        &self.recently_viewed
    }

    /// Moves `product_id` to the front of the recently viewed list.
    pub fn view_product(&mut self, product_id: &str) -> Result<(), StoreError> {
        let mut recent = self.recently_viewed.clone();
        recent.retain(|id| id != product_id);
        recent.insert(0, product_id.to_string());
        recent.truncate(RECENTLY_VIEWED_LIMIT);

        self.persist(keys::RECENTLY_VIEWED, &recent)?;
        self.recently_viewed = recent;
        self.notify(StoreEvent::RecentlyViewedChanged);
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.persist(keys::THEME, &theme)?;
        self.theme = theme;
        self.notify(StoreEvent::ThemeChanged(theme));
        Ok(())
    }

    // Accounts

    pub fn session(&self) -> Option<&User> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Starts (`Some`) or ends (`None`) the session.
    pub fn set_session(&mut self, user: Option<User>) -> Result<(), StoreError> {
        match &user {
            Some(u) => {
                save_json(self.kv.as_mut(), keys::SESSION, u)?;
                info!("Logged in as {}", u.email);
            }
            None => self.kv.remove(keys::SESSION)?,
        }
        let logged_in = user.is_some();
        self.session = user;
        self.notify(StoreEvent::SessionChanged { logged_in });
        Ok(())
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Inserts a user, replacing any record with the same email.
    pub fn upsert_user(&mut self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.clone();
        match users.iter_mut().find(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }
        self.persist(keys::USERS, &users)?;
        self.users = users;
        Ok(())
    }

    pub fn challenge(&self) -> Option<Challenge> {
        load_json(self.kv.as_ref(), keys::AUTH_CHALLENGE)
    }

    pub fn set_challenge(&mut self, challenge: Option<&Challenge>) -> Result<(), StoreError> {
        match challenge {
            Some(c) => self.persist(keys::AUTH_CHALLENGE, c),
            None => self.kv.remove(keys::AUTH_CHALLENGE),
        }
    }

    // Orders

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Records `order`, empties the cart and drops the discount as one step.
    ///
    /// If any write fails, the writes already made are restored and the
    /// in-memory state is left as it was.
    pub fn complete_order(&mut self, order: Order) -> Result<(), StoreError> {
        let id = order.id.clone();
        let mut orders = self.orders.clone();
        orders.push(order);
        self.persist(keys::ORDERS, &orders)?;

        let previous_orders = self.orders.clone();
        if let Err(e) = self.persist(keys::CART, &Cart::default()) {
            self.restore(keys::ORDERS, &previous_orders);
            return Err(e);
        }

        if let Err(e) = self.kv.remove(keys::DISCOUNT) {
            let previous_cart = self.cart.clone();
            self.restore(keys::CART, &previous_cart);
            self.restore(keys::ORDERS, &previous_orders);
            return Err(e);
        }

        self.orders = orders;
        self.cart = Cart::default();
        self.discount.reset();

        self.notify(StoreEvent::OrderPlaced { id });
        self.notify(StoreEvent::CartChanged { count: 0 });
        self.notify(StoreEvent::DiscountChanged { fraction: 0.0 });
        Ok(())
    }

    fn restore<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        if let Err(e) = self.persist(key, value) {
            warn!("Could not restore {} after a failed write: {}", key, e);
        }
    }
}
