use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Author, AuthorProfile, Category, Comment, Post, Subscriber, User, Vote};
use crate::error::RepoError;

use super::query::{Page, PostQuery};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, cascading to dependent rows.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError>;

    /// All authors with their display names, ordered by username.
    async fn list_profiles(&self) -> Result<Vec<AuthorProfile>, RepoError>;

    /// Overwrite the stored reputation (last write wins).
    async fn set_rating(&self, id: Uuid, rating: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Insert a post together with its category links in one unit of work.
    async fn create_with_categories(
        &self,
        post: Post,
        category_ids: &[Uuid],
    ) -> Result<Post, RepoError>;

    /// Update a post and replace its category links.
    ///
    /// Returns the stored post and the category ids whose links were added.
    async fn update_with_categories(
        &self,
        post: Post,
        category_ids: &[Uuid],
    ) -> Result<(Post, Vec<Uuid>), RepoError>;

    /// Execute a query. Without a page window every match is returned on page 1.
    async fn query(&self, query: &PostQuery) -> Result<Page<Post>, RepoError>;

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Categories linked to a post, ordered by name.
    async fn categories_of(&self, post_id: Uuid) -> Result<Vec<Category>, RepoError>;

    /// Atomically apply the vote to the rating and return the new value.
    async fn adjust_rating(&self, id: Uuid, vote: Vote) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Atomically apply the vote to the rating and return the new value.
    async fn adjust_rating(&self, id: Uuid, vote: Vote) -> Result<i64, RepoError>;
}

#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Store a new subscription row. Existing rows for the pair are kept.
    async fn subscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<Subscriber, RepoError>;

    /// Remove every row for the pair and return how many were removed.
    async fn unsubscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<u64, RepoError>;

    async fn find_by_category(&self, category_id: Uuid) -> Result<Vec<Subscriber>, RepoError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Subscriber>, RepoError>;

    async fn count_for(&self, user_id: Uuid, category_id: Uuid) -> Result<u64, RepoError>;
}
