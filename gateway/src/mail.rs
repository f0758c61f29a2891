//! Email delivery through a transactional mail HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use auth::{Notifier, NotifyError};
use reqwest::Client;
use serde::Serialize;

use crate::config::MailConfig;

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends mail by POSTing JSON to the configured API.
pub struct HttpMailNotifier {
    client: Client,
    config: MailConfig,
}

impl HttpMailNotifier {
    pub fn new(config: MailConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifyError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for HttpMailNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let request = MailRequest {
            from: &self.config.from,
            to,
            subject,
            text: body,
        };

        let mut builder = self.client.post(&self.config.api_url).json(&request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NotifyError(format!("Mail request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError(format!("Mail API returned {}: {}", status, body)));
        }

        tracing::debug!("Mail '{}' accepted for {}", subject, to);
        Ok(())
    }
}
