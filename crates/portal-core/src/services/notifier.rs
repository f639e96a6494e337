//! Category subscription notifications.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post, mask_email};
use crate::error::DomainError;
use crate::ports::{
    AuthorRepository, CategoriesLinked, EmailMessage, MailError, Mailer, PostEventListener,
    PostRepository, SubscriberRepository, UserRepository,
};

/// Where links in notification mail point and how long a send may take.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Scheme and host, without a trailing slash.
    pub site_url: String,
    /// Path under which post detail pages are mounted.
    pub post_path_prefix: String,
    pub send_timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            site_url: "http://127.0.0.1:8000".to_string(),
            post_path_prefix: "/news".to_string(),
            send_timeout: Duration::from_secs(10),
        }
    }
}

impl NotifierConfig {
    pub fn post_url(&self, post_id: Uuid) -> String {
        format!(
            "{}{}/{}",
            self.site_url.trim_end_matches('/'),
            self.post_path_prefix.trim_end_matches('/'),
            post_id
        )
    }
}

/// Outcome of one notification round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationReport {
    pub sent: usize,
    pub failed: usize,
}

/// The rendered parts shared by every message of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl NotificationContent {
    pub fn new(post: &Post, author_name: &str, categories: &[Category], link: &str) -> Self {
        let names = categories
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let subject = format!("New publication in category {names}");
        let text_body = format!(
            "Publication title: {}\nPublication author: {}\nPublication type: {}\n\nLink to the publication: {}",
            post.title,
            author_name,
            post.kind.label(),
            link
        );
        let html_body = format!(
            "Publication title: {}<br>Publication author: {}<br>Publication type: {}<br><br><a href=\"{}\">Link to the publication</a>",
            html_escape::encode_text(&post.title),
            html_escape::encode_text(author_name),
            post.kind.label(),
            html_escape::encode_double_quoted_attribute(link)
        );

        Self {
            subject,
            text_body,
            html_body,
        }
    }

    pub fn message_to(&self, recipient: &str) -> EmailMessage {
        EmailMessage {
            to: vec![recipient.to_string()],
            subject: self.subject.clone(),
            text_body: self.text_body.clone(),
            html_body: self.html_body.clone(),
        }
    }
}

/// Mails the subscribers of every category a post is linked to.
///
/// Recipients are collected per category without deduplication: a user
/// subscribed to two of the post's categories receives two messages.
#[derive(Clone)]
pub struct SubscriptionNotifier {
    posts: Arc<dyn PostRepository>,
    authors: Arc<dyn AuthorRepository>,
    users: Arc<dyn UserRepository>,
    subscribers: Arc<dyn SubscriberRepository>,
    mailer: Arc<dyn Mailer>,
    config: NotifierConfig,
}

impl SubscriptionNotifier {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        authors: Arc<dyn AuthorRepository>,
        users: Arc<dyn UserRepository>,
        subscribers: Arc<dyn SubscriberRepository>,
        mailer: Arc<dyn Mailer>,
        config: NotifierConfig,
    ) -> Self {
        Self {
            posts,
            authors,
            users,
            subscribers,
            mailer,
            config,
        }
    }

    /// Send one message per (category, subscriber) pair for the post.
    ///
    /// Delivery failures and timeouts are logged and counted; they never
    /// stop the remaining sends.
    pub async fn notify(&self, post_id: Uuid) -> Result<NotificationReport, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        let author_name = self.author_name(&post).await?;
        let categories = self.posts.categories_of(post.id).await?;
        let recipients = self.recipients(&categories).await?;

        if recipients.is_empty() {
            tracing::debug!(post_id = %post.id, "No subscribers to notify");
            return Ok(NotificationReport::default());
        }

        let content = NotificationContent::new(
            &post,
            &author_name,
            &categories,
            &self.config.post_url(post.id),
        );

        let mut report = NotificationReport::default();
        for recipient in &recipients {
            let message = content.message_to(recipient);
            match deliver(self.mailer.as_ref(), &message, self.config.send_timeout).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        post_id = %post.id,
                        recipient = %mask_email(recipient),
                        error = %e,
                        "Failed to deliver post notification"
                    );
                }
            }
        }

        tracing::info!(
            post_id = %post.id,
            sent = report.sent,
            failed = report.failed,
            "Post notifications dispatched"
        );
        Ok(report)
    }

    async fn author_name(&self, post: &Post) -> Result<String, DomainError> {
        let author = self
            .authors
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Author", post.author_id))?;

        let user = self
            .users
            .find_by_id(author.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", author.user_id))?;

        Ok(user.username)
    }

    async fn recipients(&self, categories: &[Category]) -> Result<Vec<String>, DomainError> {
        let mut emails = Vec::new();
        for category in categories {
            for subscriber in self.subscribers.find_by_category(category.id).await? {
                match self.users.find_by_id(subscriber.user_id).await? {
                    Some(user) => emails.push(user.email),
                    None => tracing::warn!(
                        subscriber_id = %subscriber.id,
                        "Subscriber references a missing user"
                    ),
                }
            }
        }
        Ok(emails)
    }
}

#[async_trait]
impl PostEventListener for SubscriptionNotifier {
    async fn categories_linked(&self, event: &CategoriesLinked) {
        if event.added.is_empty() {
            return;
        }

        if let Err(e) = self.notify(event.post_id).await {
            tracing::error!(post_id = %event.post_id, error = %e, "Post notification failed");
        }
    }
}

/// Send one message, giving up once `limit` has elapsed.
async fn deliver(
    mailer: &dyn Mailer,
    message: &EmailMessage,
    limit: Duration,
) -> Result<(), MailError> {
    tokio::time::timeout(limit, mailer.send(message))
        .await
        .map_err(|_| MailError::Timeout(limit.as_secs()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostKind;

    fn sample_post() -> Post {
        Post::new(
            Uuid::new_v4(),
            PostKind::News,
            "Rates <up>".into(),
            "The central bank raised rates.".into(),
        )
    }

    #[test]
    fn test_post_url_joins_parts() {
        let config = NotifierConfig {
            site_url: "https://portal.example/".into(),
            post_path_prefix: "/news/".into(),
            send_timeout: Duration::from_secs(1),
        };
        let id = Uuid::new_v4();
        assert_eq!(config.post_url(id), format!("https://portal.example/news/{id}"));
    }

    #[test]
    fn test_content_carries_title_author_kind_and_link() {
        let post = sample_post();
        let categories = vec![
            Category::new("Economy".into()),
            Category::new("Politics".into()),
        ];
        let content =
            NotificationContent::new(&post, "anna", &categories, "http://h/news/1");

        assert_eq!(content.subject, "New publication in category Economy, Politics");
        assert!(content.text_body.contains("Publication title: Rates <up>"));
        assert!(content.text_body.contains("Publication author: anna"));
        assert!(content.text_body.contains("Publication type: News"));
        assert!(content.text_body.contains("http://h/news/1"));

        assert!(content.html_body.contains("Rates &lt;up&gt;"));
        assert!(content.html_body.contains("<a href=\"http://h/news/1\">"));
    }

    #[test]
    fn test_link_is_escaped_as_attribute() {
        let post = sample_post();
        let content = NotificationContent::new(&post, "O'Neil & co", &[], "http://h/?a=\"1\"");

        assert!(content.html_body.contains("Publication author: O'Neil &amp; co"));
        assert!(content.html_body.contains("href=\"http://h/?a=&quot;1&quot;\""));
    }

    struct StalledMailer;

    #[async_trait]
    impl Mailer for StalledMailer {
        async fn send(&self, _message: &EmailMessage) -> Result<(), MailError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deliver_reports_timeout() {
        let post = sample_post();
        let message = NotificationContent::new(&post, "anna", &[], "http://h/news/1")
            .message_to("reader@example.com");

        let result = deliver(&StalledMailer, &message, Duration::from_secs(2)).await;
        assert!(matches!(result, Err(MailError::Timeout(2))));
    }

    #[test]
    fn test_message_has_single_recipient() {
        let post = sample_post();
        let content = NotificationContent::new(&post, "anna", &[], "http://h/news/1");
        let message = content.message_to("reader@example.com");

        assert_eq!(message.to, vec!["reader@example.com".to_string()]);
        assert_eq!(message.text_body, content.text_body);
        assert_eq!(message.html_body, content.html_body);
    }
}
