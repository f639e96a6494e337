//! Application state - shared across all handlers.

use std::sync::Arc;

use portal_core::ports::{
    AuthorRepository, CategoryRepository, CommentRepository, Mailer, PostRepository,
    SubscriberRepository, UserRepository,
};
use portal_core::services::{
    Censor, PublishingService, RatingService, SubscriptionNotifier, SubscriptionService,
};
use portal_infra::memory::{
    InMemoryAuthorRepository, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryPostRepository, InMemorySubscriberRepository, InMemoryUserRepository,
};
use portal_infra::{InMemoryDatabase, LogMailer};

use crate::config::AppConfig;
use crate::middleware::csrf::CsrfStore;

/// One repository per entity, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub subscribers: Arc<dyn SubscriberRepository>,
    /// `postgres` or `memory`, reported by the health check.
    pub backend: &'static str,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let db = InMemoryDatabase::new();
        Self {
            users: Arc::new(InMemoryUserRepository::new(db.clone())),
            authors: Arc::new(InMemoryAuthorRepository::new(db.clone())),
            categories: Arc::new(InMemoryCategoryRepository::new(db.clone())),
            posts: Arc::new(InMemoryPostRepository::new(db.clone())),
            comments: Arc::new(InMemoryCommentRepository::new(db.clone())),
            subscribers: Arc::new(InMemorySubscriberRepository::new(db)),
            backend: "memory",
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: portal_infra::database::DbConn) -> Self {
        use portal_infra::database::{
            PostgresAuthorRepository, PostgresCategoryRepository, PostgresCommentRepository,
            PostgresPostRepository, PostgresSubscriberRepository, PostgresUserRepository,
        };

        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            authors: Arc::new(PostgresAuthorRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            subscribers: Arc::new(PostgresSubscriberRepository::new(db)),
            backend: "postgres",
        }
    }

    /// Connect to PostgreSQL when configured, falling back to memory.
    pub async fn from_config(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match portal_infra::database::connect(db_config).await {
                    Ok(conn) => return Self::postgres(conn),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        return Self::in_memory();
                    }
                }
            }
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        #[cfg(not(feature = "postgres"))]
        {
            if config.database.is_some() {
                tracing::warn!("Built without postgres feature - ignoring DATABASE_URL");
            }
            tracing::info!("Running without postgres feature - using in-memory repositories");
        }

        Self::in_memory()
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub publishing: PublishingService,
    pub subscriptions: SubscriptionService,
    pub rating: RatingService,
    pub censor: Arc<Censor>,
    pub csrf: CsrfStore,
}

impl AppState {
    /// Wire services over the given repositories and mailer.
    pub fn assemble(repos: Repositories, mailer: Arc<dyn Mailer>, config: &AppConfig) -> Self {
        let notifier = SubscriptionNotifier::new(
            repos.posts.clone(),
            repos.authors.clone(),
            repos.users.clone(),
            repos.subscribers.clone(),
            mailer,
            config.notifier(),
        );

        let publishing = PublishingService::new(
            repos.posts.clone(),
            repos.authors.clone(),
            repos.categories.clone(),
        )
        .with_listener(Arc::new(notifier));

        let subscriptions =
            SubscriptionService::new(repos.categories.clone(), repos.subscribers.clone());

        let rating = RatingService::new(
            repos.authors.clone(),
            repos.posts.clone(),
            repos.comments.clone(),
        );

        Self {
            repos,
            publishing,
            subscriptions,
            rating,
            censor: Arc::new(config.censor()),
            csrf: CsrfStore::new(),
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Repositories::from_config(config).await;
        let mailer = build_mailer(config);

        tracing::info!(backend = repos.backend, "Application state initialized");
        Self::assemble(repos, mailer, config)
    }
}

fn build_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    let Some(host) = &config.mail.smtp_host else {
        tracing::warn!("SMTP_HOST not set. Notification mail is only logged.");
        return Arc::new(LogMailer);
    };

    #[cfg(feature = "smtp")]
    {
        let smtp = portal_infra::SmtpConfig {
            host: host.clone(),
            port: config.mail.smtp_port,
            username: config.mail.smtp_username.clone(),
            password: config.mail.smtp_password.clone(),
            starttls: config.mail.smtp_starttls,
            from: config.mail.from.clone(),
        };
        match portal_infra::SmtpMailer::new(&smtp) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                tracing::error!("Invalid SMTP configuration: {}. Mail is only logged.", e);
                Arc::new(LogMailer)
            }
        }
    }

    #[cfg(not(feature = "smtp"))]
    {
        tracing::warn!(%host, "Built without smtp feature - mail is only logged");
        Arc::new(LogMailer)
    }
}
