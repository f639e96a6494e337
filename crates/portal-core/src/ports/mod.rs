//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod events;
mod mailer;
mod query;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use events::{CategoriesLinked, PostEventListener};
pub use mailer::{EmailMessage, MailError, Mailer};
pub use query::{Page, PageRequest, PostOrdering, PostQuery};
pub use repository::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, PostRepository,
    SubscriberRepository, UserRepository,
};
