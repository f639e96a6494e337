use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use portal_core::ports::{EmailMessage, MailError, Mailer};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upgrade the connection with STARTTLS before authenticating.
    pub starttls: bool,
    /// Sender address, optionally with a display name.
    pub from: String,
}

/// SMTP delivery through lettre's tokio transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::Address(e.to_string()))?;

        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::info!(
            host = %config.host,
            port = config.port,
            starttls = config.starttls,
            "SMTP mailer configured"
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(message.subject.clone());

        for to in &message.to {
            let mailbox: Mailbox = to
                .parse()
                .map_err(|e: lettre::address::AddressError| MailError::Address(e.to_string()))?;
            builder = builder.to(mailbox);
        }

        let email = builder
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(from: &str) -> SmtpConfig {
        SmtpConfig {
            host: "localhost".into(),
            port: 2525,
            username: None,
            password: None,
            starttls: false,
            from: from.into(),
        }
    }

    #[tokio::test]
    async fn test_invalid_sender_is_rejected() {
        assert!(matches!(
            SmtpMailer::new(&config("not an address")),
            Err(MailError::Address(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_before_connecting() {
        let mailer = SmtpMailer::new(&config("Portal <noreply@localhost>")).unwrap();
        let message = EmailMessage {
            to: vec!["nobody".into()],
            subject: "Hi".into(),
            text_body: "Hi".into(),
            html_body: "<p>Hi</p>".into(),
        };

        assert!(matches!(
            mailer.send(&message).await,
            Err(MailError::Address(_))
        ));
    }
}
