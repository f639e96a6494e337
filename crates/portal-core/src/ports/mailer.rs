//! Outbound email port.

use async_trait::async_trait;

/// A message with a plain-text body and an HTML alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Mail transport - abstraction over SMTP and development backends.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Delivery timed out after {0} seconds")]
    Timeout(u64),
}
