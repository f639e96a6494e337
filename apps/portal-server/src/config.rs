//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use portal_core::services::{Censor, NotifierConfig};
use portal_infra::DatabaseConfig;
use portal_infra::auth::{DEFAULT_JWT_SECRET, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Scheme and host used for absolute links in mail.
    pub site_url: String,
    pub mail: MailSettings,
    /// Comma-separated forbidden words; `None` keeps the built-in list.
    pub censor_words: Option<String>,
    pub jwt: JwtConfig,
}

/// Outbound mail settings. Without `smtp_host` mail is only logged.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_starttls: bool,
    pub from: String,
    pub timeout_secs: u64,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: 25,
            smtp_username: None,
            smtp_password: None,
            smtp_starttls: false,
            from: "noreply@localhost".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            site_url: "http://127.0.0.1:8000".to_string(),
            mail: MailSettings::default(),
            censor_words: None,
            jwt: JwtConfig::default(),
        }
    }
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: var_or("DB_MAX_CONNECTIONS", 100),
            min_connections: var_or("DB_MIN_CONNECTIONS", 10),
        });

        let mail = MailSettings {
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: var_or("SMTP_PORT", 25),
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            smtp_starttls: flag("SMTP_STARTTLS"),
            from: env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@localhost".to_string()),
            timeout_secs: var_or("MAIL_TIMEOUT_SECS", 10),
        };

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            expiration_hours: var_or("JWT_EXPIRATION_HOURS", 24),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "news-portal".to_string()),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: var_or("PORT", 8080),
            database,
            site_url: env::var("SITE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
            mail,
            censor_words: env::var("CENSOR_WORDS").ok(),
            jwt,
        }
    }

    pub fn censor(&self) -> Censor {
        match &self.censor_words {
            Some(list) => Censor::from_list(list),
            None => Censor::default(),
        }
    }

    pub fn notifier(&self) -> NotifierConfig {
        NotifierConfig {
            site_url: self.site_url.clone(),
            send_timeout: Duration::from_secs(self.mail.timeout_secs),
            ..NotifierConfig::default()
        }
    }

    /// Warn when the token secret is still the placeholder.
    pub fn check_secrets(&self) {
        if self.jwt.secret != DEFAULT_JWT_SECRET {
            return;
        }

        let is_production = env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        if is_production {
            tracing::error!(
                "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
            );
        } else {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }
    }
}
