use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use portal_core::ports::{EmailMessage, MailError, Mailer};

/// Keeps every delivered message in memory.
///
/// Addresses registered with [`RecordingMailer::failing_for`] are rejected
/// with a transport error, which lets callers exercise partial failures.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
    rejected: Arc<HashSet<String>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outbox: Arc::default(),
            rejected: Arc::new(addresses.into_iter().map(Into::into).collect()),
        }
    }

    pub async fn messages(&self) -> Vec<EmailMessage> {
        self.outbox.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.outbox.lock().await.clear();
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if let Some(to) = message.to.iter().find(|to| self.rejected.contains(*to)) {
            return Err(MailError::Transport(format!("recipient refused: {to}")));
        }

        self.outbox.lock().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            to: vec![to.to_string()],
            subject: "Subject".into(),
            text_body: "Text".into(),
            html_body: "<p>Text</p>".into(),
        }
    }

    #[tokio::test]
    async fn test_records_sent_messages() {
        let mailer = RecordingMailer::new();

        mailer.send(&message("a@example.com")).await.unwrap();
        mailer.send(&message("b@example.com")).await.unwrap();

        let sent = mailer.messages().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, vec!["b@example.com".to_string()]);

        mailer.clear().await;
        assert!(mailer.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_address_is_not_recorded() {
        let mailer = RecordingMailer::failing_for(["bad@example.com"]);

        assert!(matches!(
            mailer.send(&message("bad@example.com")).await,
            Err(MailError::Transport(_))
        ));
        assert!(mailer.messages().await.is_empty());
    }
}
