//! # Portal Infrastructure
//!
//! Concrete implementations of the ports defined in `portal-core`:
//! persistence, mail delivery and authentication.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store and log mailer only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `smtp` - SMTP delivery via lettre

pub mod database;
pub mod mail;
pub mod memory;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::DatabaseConfig;
pub use mail::{LogMailer, RecordingMailer};
pub use memory::InMemoryDatabase;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "smtp")]
pub use mail::{SmtpConfig, SmtpMailer};
