//! Account registration, password login, email one-time codes and password
//! reset.
//!
//! Users and the session live in [`Store`]; pending codes and reset tokens
//! are persisted as a single [`Challenge`] so a flow can span separate CLI
//! runs. A failed email dispatch never blocks a flow: the secret is handed
//! back to the caller as [`Delivery::Fallback`].

pub mod email;
pub mod password;

pub use email::{EmailClient, EmailDispatcher};

use crate::error::AuthError;
use crate::store::Store;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Wrong guesses allowed before a pending code or token is discarded.
pub const MAX_ATTEMPTS: u32 = 5;

/// A registered account. `pass` holds an argon2 PHC string, or is empty for
/// accounts created through a one-time code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub pass: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Otp,
    Reset,
}

/// A pending one-time code or reset token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub email: String,
    pub kind: ChallengeKind,
    pub secret: String,
    pub expires_at: DateTime<Utc>,
    /// Wrong guesses so far
    #[serde(default)]
    pub attempts: u32,
}

impl Challenge {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// How a code or link reached the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Sent,
    /// Dispatch failed; show `passcode` to the user directly.
    Fallback { passcode: String, reason: String },
}

/// Account flows over a [`Store`].
#[derive(Debug, Clone)]
pub struct Accounts {
    reset_base_url: String,
    otp_ttl: TimeDelta,
    reset_ttl: TimeDelta,
}

impl Accounts {
    pub fn new(reset_base_url: impl Into<String>) -> Self {
        Self {
            reset_base_url: reset_base_url.into(),
            otp_ttl: TimeDelta::minutes(10),
            reset_ttl: TimeDelta::hours(1),
        }
    }

    /// Overrides how long codes and reset tokens stay valid.
    pub fn with_ttl(mut self, otp_ttl: TimeDelta, reset_ttl: TimeDelta) -> Self {
        self.otp_ttl = otp_ttl;
        self.reset_ttl = reset_ttl;
        self
    }

    /// Creates an account and logs it in.
    pub fn register(
        &self,
        store: &mut Store,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() {
            return Err(AuthError::NameRequired);
        }
        password::validate_email(email)?;
        password::validate_password(password)?;
        if store.find_user(email).is_some() {
            return Err(AuthError::EmailTaken(email.to_string()));
        }

        let user = User {
            name: name.to_string(),
            email: email.to_string(),
            pass: password::hash_password(password)?,
        };
        store.upsert_user(user.clone())?;
        store.set_session(Some(user.clone()))?;
        info!("Registered {}", user.email);
        Ok(user)
    }

    pub fn login(&self, store: &mut Store, email: &str, password: &str) -> Result<User, AuthError> {
        let user = store
            .find_user(email.trim())
            .filter(|u| password::verify_password(password, &u.pass))
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        store.set_session(Some(user.clone()))?;
        Ok(user)
    }

    pub fn logout(&self, store: &mut Store) -> Result<(), AuthError> {
        store.set_session(None)?;
        Ok(())
    }

    /// Issues a six-digit login code for `email` and emails it.
    pub async fn request_otp(
        &self,
        store: &mut Store,
        mailer: &dyn EmailDispatcher,
        email: &str,
    ) -> Result<Delivery, AuthError> {
        let email = email.trim();
        password::validate_email(email)?;

        let code = rand::rng().random_range(100_000..=999_999u32).to_string();
        let challenge = Challenge {
            email: email.to_string(),
            kind: ChallengeKind::Otp,
            secret: code.clone(),
            expires_at: Utc::now() + self.otp_ttl,
            attempts: 0,
        };
        store.set_challenge(Some(&challenge))?;
        debug!("Issued login code for {}", email);

        Ok(dispatch(mailer, email, code).await)
    }

    /// Checks a login code. Unknown emails get an account named after the
    /// local part of the address.
    pub fn verify_otp(&self, store: &mut Store, email: &str, code: &str) -> Result<User, AuthError> {
        let email = email.trim();
        self.take_challenge(store, email, ChallengeKind::Otp, code.trim())?;

        let user = match store.find_user(email) {
            Some(existing) => existing.clone(),
            None => {
                let name = email.split('@').next().unwrap_or(email).to_string();
                let user = User { name, email: email.to_string(), pass: String::new() };
                store.upsert_user(user.clone())?;
                info!("Created account for {} from login code", email);
                user
            }
        };

        store.set_session(Some(user.clone()))?;
        Ok(user)
    }

    /// Emails a password reset link to a registered address.
    pub async fn request_reset(
        &self,
        store: &mut Store,
        mailer: &dyn EmailDispatcher,
        email: &str,
    ) -> Result<Delivery, AuthError> {
        let email = email.trim();
        password::validate_email(email)?;
        if store.find_user(email).is_none() {
            return Err(AuthError::UnknownAccount(email.to_string()));
        }

        let token = format!("{:032x}", rand::rng().random::<u128>());
        let challenge = Challenge {
            email: email.to_string(),
            kind: ChallengeKind::Reset,
            secret: token.clone(),
            expires_at: Utc::now() + self.reset_ttl,
            attempts: 0,
        };
        store.set_challenge(Some(&challenge))?;

        let link = self.reset_link(email, &token);
        debug!("Issued reset link for {}", email);
        Ok(dispatch(mailer, email, link).await)
    }

    /// Replaces the password of `email` if `token` matches the pending reset.
    pub fn reset_password(
        &self,
        store: &mut Store,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = email.trim();
        password::validate_password(new_password)?;

        let mut user = store
            .find_user(email)
            .cloned()
            .ok_or_else(|| AuthError::UnknownAccount(email.to_string()))?;
        self.take_challenge(store, email, ChallengeKind::Reset, token.trim())?;

        user.pass = password::hash_password(new_password)?;
        store.upsert_user(user)?;
        info!("Password reset for {}", email);
        Ok(())
    }

    /// Builds `<base>?email=<encoded>&token=<token>`.
    pub fn reset_link(&self, email: &str, token: &str) -> String {
        format!("{}?email={}&token={}", self.reset_base_url, urlencoding::encode(email), token)
    }

    /// Validates and consumes the pending challenge. A wrong secret leaves it
    /// in place; an expired one is discarded.
    fn take_challenge(
        &self,
        store: &mut Store,
        email: &str,
        kind: ChallengeKind,
        secret: &str,
    ) -> Result<(), AuthError> {
        let mut challenge = store
            .challenge()
            .filter(|c| c.kind == kind && c.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| AuthError::NoChallenge(email.to_string()))?;

        if challenge.is_expired(Utc::now()) {
            store.set_challenge(None)?;
            return Err(AuthError::Expired);
        }
        if challenge.secret != secret {
            challenge.attempts += 1;
            if challenge.attempts >= MAX_ATTEMPTS {
                warn!("Too many wrong codes for {}, discarding challenge", email);
                store.set_challenge(None)?;
                return Err(AuthError::TooManyAttempts);
            }
            store.set_challenge(Some(&challenge))?;
            return Err(AuthError::InvalidCode);
        }

        store.set_challenge(None)?;
        Ok(())
    }
}

async fn dispatch(mailer: &dyn EmailDispatcher, email: &str, passcode: String) -> Delivery {
    match mailer.send_passcode(email, &passcode).await {
        Ok(()) => Delivery::Sent,
        Err(e) => {
            warn!("Email dispatch failed, falling back to on-screen code: {:#}", e);
            Delivery::Fallback { passcode, reason: format!("{:#}", e) }
        }
    }
}
