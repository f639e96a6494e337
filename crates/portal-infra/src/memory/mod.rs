//! In-memory persistence, the fallback when no database is configured.

mod repo;
mod store;

pub use repo::{
    InMemoryAuthorRepository, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryPostRepository, InMemoryRepository, InMemorySubscriberRepository,
    InMemoryUserRepository, Stored,
};
pub use store::{InMemoryDatabase, Tables};
