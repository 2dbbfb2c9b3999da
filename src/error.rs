//! Typed errors for the storefront core.
//!
//! Validation and lookup failures never mutate state. HTTP plumbing stays on
//! `anyhow` and is folded into [`CatalogError`] at the loader boundary.

use crate::catalog::models::FeedSource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to fetch {feed} feed: {reason}")]
    Fetch { feed: FeedSource, reason: String },

    #[error("{feed} feed timed out after {secs}s")]
    Timeout { feed: FeedSource, secs: u64 },

    #[error("malformed {feed} payload: {source}")]
    Deserialize {
        feed: FeedSource,
        #[source]
        source: serde_json::Error,
    },

    #[error("no product feed could be loaded")]
    AllFeedsFailed,
}

impl CatalogError {
    /// The feed this error is attributed to, if any.
    pub fn feed(&self) -> Option<FeedSource> {
        match self {
            CatalogError::Fetch { feed, .. }
            | CatalogError::Timeout { feed, .. }
            | CatalogError::Deserialize { feed, .. } => Some(*feed),
            CatalogError::AllFeedsFailed => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("please select a size")]
    SizeRequired,

    #[error("invalid coupon code \"{0}\"")]
    InvalidCoupon(String),

    #[error("storage I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("please log in to place an order")]
    NotLoggedIn,

    #[error("your cart is empty")]
    EmptyCart,

    #[error("an order is already being submitted")]
    InProgress,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("please enter a valid email address")]
    InvalidEmail,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("please enter your name")]
    NameRequired,

    #[error("an account with {0} already exists")]
    EmailTaken(String),

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("no account found for {0}")]
    UnknownAccount(String),

    #[error("no pending verification for {0}")]
    NoChallenge(String),

    #[error("the code or link has expired")]
    Expired,

    #[error("the code or link is not valid")]
    InvalidCode,

    #[error("too many incorrect attempts; request a new code")]
    TooManyAttempts,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
