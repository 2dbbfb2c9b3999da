//! Account, session, and preference commands.

use crate::auth::{Accounts, Delivery, EmailClient, EmailDispatcher};
use crate::config::Config;
use crate::store::{Store, Theme};
use anyhow::{Context, Result};

/// Registration, login, one-time codes, and password reset.
pub struct AccountCommand {
    config: Config,
    accounts: Accounts,
}

impl AccountCommand {
    pub fn new(config: Config) -> Self {
        let accounts = Accounts::new(config.reset_base_url.clone());
        Self { config, accounts }
    }

    pub fn register(&self, store: &mut Store, name: &str, email: &str, password: &str) -> Result<String> {
        let user = self.accounts.register(store, name, email, password)?;
        Ok(format!("Welcome, {}! You are now logged in.", user.name))
    }

    pub fn login(&self, store: &mut Store, email: &str, password: &str) -> Result<String> {
        let user = self.accounts.login(store, email, password)?;
        Ok(format!("Logged in as {}.", user.email))
    }

    pub fn logout(&self, store: &mut Store) -> Result<String> {
        self.accounts.logout(store)?;
        Ok("Logged out.".to_string())
    }

    pub fn whoami(&self, store: &Store) -> String {
        match store.session() {
            Some(user) => format!("{} <{}>", user.name, user.email),
            None => "Not logged in.".to_string(),
        }
    }

    /// Emails a login code.
    pub async fn send_otp(&self, store: &mut Store, email: &str) -> Result<String> {
        let mailer = EmailClient::new(&self.config).context("Failed to create HTTP client")?;
        self.send_otp_with(&mailer, store, email).await
    }

    /// Emails a login code with a provided dispatcher (for testing).
    pub async fn send_otp_with(
        &self,
        mailer: &dyn EmailDispatcher,
        store: &mut Store,
        email: &str,
    ) -> Result<String> {
        let delivery = self.accounts.request_otp(store, mailer, email).await?;
        Ok(match delivery {
            Delivery::Sent => format!("A login code was sent to {}.", email.trim()),
            Delivery::Fallback { passcode, .. } => {
                format!("Email could not be sent. Your login code is {}.", passcode)
            }
        })
    }

    pub fn verify_otp(&self, store: &mut Store, email: &str, code: &str) -> Result<String> {
        let user = self.accounts.verify_otp(store, email, code)?;
        Ok(format!("Logged in as {}.", user.email))
    }

    /// Emails a password reset link.
    pub async fn request_reset(&self, store: &mut Store, email: &str) -> Result<String> {
        let mailer = EmailClient::new(&self.config).context("Failed to create HTTP client")?;
        self.request_reset_with(&mailer, store, email).await
    }

    pub async fn request_reset_with(
        &self,
        mailer: &dyn EmailDispatcher,
        store: &mut Store,
        email: &str,
    ) -> Result<String> {
        let delivery = self.accounts.request_reset(store, mailer, email).await?;
        Ok(match delivery {
            Delivery::Sent => format!("A reset link was sent to {}.", email.trim()),
            Delivery::Fallback { passcode, .. } => {
                format!("Email could not be sent. Open this link to reset: {}", passcode)
            }
        })
    }

    pub fn confirm_reset(
        &self,
        store: &mut Store,
        email: &str,
        token: &str,
        password: &str,
    ) -> Result<String> {
        self.accounts.reset_password(store, email, token, password)?;
        Ok("Password updated. You can now log in.".to_string())
    }

    /// Shows or changes the theme preference.
    pub fn theme(&self, store: &mut Store, theme: Option<Theme>) -> Result<String> {
        if let Some(theme) = theme {
            store.set_theme(theme)?;
        }
        Ok(format!("Theme: {}", store.theme()))
    }
}
