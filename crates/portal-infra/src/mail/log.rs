use async_trait::async_trait;

use portal_core::domain::mask_email;
use portal_core::ports::{EmailMessage, MailError, Mailer};

/// Writes each message to the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let recipients = message
            .to
            .iter()
            .map(|to| mask_email(to))
            .collect::<Vec<_>>()
            .join(", ");

        tracing::info!(
            to = %recipients,
            subject = %message.subject,
            body = %message.text_body,
            "Email (log backend)"
        );
        Ok(())
    }
}
