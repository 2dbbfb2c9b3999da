//! Transactional email dispatch for one-time codes and reset links.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;

/// Trait for sending a passcode email - enables mocking for tests.
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// Sends `passcode` (a numeric code or a full reset URL) to `email`.
    async fn send_passcode(&self, email: &str, passcode: &str) -> Result<()>;
}

/// JSON body accepted by the dispatch endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailRequest {
    pub service_id: String,
    pub template_id: String,
    pub user_id: String,
    pub template_params: TemplateParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateParams {
    pub email: String,
    pub passcode: String,
}

/// HTTP email dispatcher.
pub struct EmailClient {
    client: Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    user_id: String,
}

impl EmailClient {
    /// Creates a dispatcher for the endpoint and template in the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.email_endpoint.clone(),
            service_id: config.email_service_id.clone(),
            template_id: config.email_template_id.clone(),
            user_id: config.email_user_id.clone(),
        })
    }

    /// Builds the request body for one email.
    pub fn request(&self, email: &str, passcode: &str) -> EmailRequest {
        EmailRequest {
            service_id: self.service_id.clone(),
            template_id: self.template_id.clone(),
            user_id: self.user_id.clone(),
            template_params: TemplateParams {
                email: email.to_string(),
                passcode: passcode.to_string(),
            },
        }
    }
}

#[async_trait]
impl EmailDispatcher for EmailClient {
    async fn send_passcode(&self, email: &str, passcode: &str) -> Result<()> {
        let body = serde_json::to_string(&self.request(email, passcode))
            .context("Failed to encode email request")?;

        debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .context("Failed to send email request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Email dispatch failed with status: {}", status);
        }

        info!("Sent passcode email to {}", email);
        Ok(())
    }
}
