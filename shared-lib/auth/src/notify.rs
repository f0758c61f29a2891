//! Outbound notification seam (email delivery).

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

/// Delivers a message to an email address.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Writes messages to the log instead of sending them. Development only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to, subject, "{}", body);
        Ok(())
    }
}
