//! In-memory repository implementations over [`InMemoryDatabase`].

use std::cmp::Reverse;
use std::marker::PhantomData;

use async_trait::async_trait;
use uuid::Uuid;

use portal_core::domain::{
    Author, AuthorProfile, Category, Comment, Post, PostCategory, Subscriber, User, Vote,
};
use portal_core::error::RepoError;
use portal_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, Page, PostOrdering,
    PostQuery, PostRepository, SubscriberRepository, UserRepository,
};

use super::store::{InMemoryDatabase, Tables};

fn duplicate(what: &str) -> RepoError {
    RepoError::Constraint(format!("{what} already exists"))
}

fn dangling(what: &str) -> RepoError {
    RepoError::Constraint(format!("Referenced {what} does not exist"))
}

/// A row type stored in [`Tables`], with the constraints the SQL schema enforces.
pub trait Stored: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    fn table(tables: &Tables) -> &Vec<Self>;

    fn table_mut(tables: &mut Tables) -> &mut Vec<Self>;

    /// Unique and foreign-key checks against every other row.
    fn check(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Remove the row and its dependents.
    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        let rows = Self::table_mut(tables);
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        rows.len() != before
    }
}

impl Stored for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Vec<Self> {
        &tables.users
    }

    fn table_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.users
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        let others = || tables.users.iter().filter(|u| u.id != self.id);
        if others().any(|u| u.username == self.username) {
            return Err(duplicate("Username"));
        }
        if others().any(|u| u.email == self.email) {
            return Err(duplicate("Email"));
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        tables.remove_user(id)
    }
}

impl Stored for Author {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Vec<Self> {
        &tables.authors
    }

    fn table_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.authors
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.has_user(self.user_id) {
            return Err(dangling("user"));
        }
        if tables
            .authors
            .iter()
            .any(|a| a.id != self.id && a.user_id == self.user_id)
        {
            return Err(duplicate("Author for this user"));
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        tables.remove_author(id)
    }
}

impl Stored for Category {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Vec<Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.categories
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables
            .categories
            .iter()
            .any(|c| c.id != self.id && c.name == self.name)
        {
            return Err(duplicate("Category"));
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        tables.remove_category(id)
    }
}

impl Stored for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Vec<Self> {
        &tables.posts
    }

    fn table_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.posts
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.has_author(self.author_id) {
            return Err(dangling("author"));
        }
        Ok(())
    }

    fn remove(tables: &mut Tables, id: Uuid) -> bool {
        tables.remove_post(id)
    }
}

impl Stored for Comment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Vec<Self> {
        &tables.comments
    }

    fn table_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.comments
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.has_post(self.post_id) {
            return Err(dangling("post"));
        }
        if !tables.has_user(self.user_id) {
            return Err(dangling("user"));
        }
        Ok(())
    }
}

impl Stored for Subscriber {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &Vec<Self> {
        &tables.subscribers
    }

    fn table_mut(tables: &mut Tables) -> &mut Vec<Self> {
        &mut tables.subscribers
    }

    fn check(&self, tables: &Tables) -> Result<(), RepoError> {
        if !tables.has_user(self.user_id) {
            return Err(dangling("user"));
        }
        if !tables.has_category(self.category_id) {
            return Err(dangling("category"));
        }
        Ok(())
    }
}

/// Generic in-memory repository.
pub struct InMemoryRepository<T> {
    db: InMemoryDatabase,
    _row: PhantomData<T>,
}

impl<T> InMemoryRepository<T> {
    pub fn new(db: InMemoryDatabase) -> Self {
        Self {
            db,
            _row: PhantomData,
        }
    }
}

pub type InMemoryUserRepository = InMemoryRepository<User>;
pub type InMemoryAuthorRepository = InMemoryRepository<Author>;
pub type InMemoryCategoryRepository = InMemoryRepository<Category>;
pub type InMemoryPostRepository = InMemoryRepository<Post>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;
pub type InMemorySubscriberRepository = InMemoryRepository<Subscriber>;

#[async_trait]
impl<T: Stored> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(T::table(&tables).iter().find(|row| row.id() == id).cloned())
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.db.tables.write().await;
        entity.check(&tables)?;

        let rows = T::table_mut(&mut tables);
        match rows.iter_mut().find(|row| row.id() == entity.id()) {
            Some(existing) => *existing = entity.clone(),
            None => rows.push(entity.clone()),
        }
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        if T::remove(&mut tables, id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.authors.iter().find(|a| a.user_id == user_id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<AuthorProfile>, RepoError> {
        let tables = self.db.tables.read().await;
        let mut profiles: Vec<AuthorProfile> = tables
            .authors
            .iter()
            .filter_map(|author| {
                tables
                    .users
                    .iter()
                    .find(|u| u.id == author.user_id)
                    .map(|user| AuthorProfile {
                        author: author.clone(),
                        username: user.username.clone(),
                    })
            })
            .collect();
        profiles.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(profiles)
    }

    async fn set_rating(&self, id: Uuid, rating: i64) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        let author = tables
            .authors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepoError::NotFound)?;
        author.rating = rating;
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.db.tables.read().await;
        let mut categories = tables.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.name == name).cloned())
    }
}

fn check_categories(tables: &Tables, category_ids: &[Uuid]) -> Result<(), RepoError> {
    if category_ids.iter().all(|id| tables.has_category(*id)) {
        Ok(())
    } else {
        Err(dangling("category"))
    }
}

fn sort_posts(posts: &mut [Post], ordering: PostOrdering) {
    match ordering {
        PostOrdering::NewestFirst => posts.sort_by_key(|p| Reverse(p.created_at)),
        PostOrdering::OldestFirst => posts.sort_by_key(|p| p.created_at),
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_with_categories(
        &self,
        post: Post,
        category_ids: &[Uuid],
    ) -> Result<Post, RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.has_post(post.id) {
            return Err(duplicate("Post"));
        }
        post.check(&tables)?;
        check_categories(&tables, category_ids)?;

        tables.posts.push(post.clone());
        for category_id in category_ids {
            tables
                .post_categories
                .push(PostCategory::new(post.id, *category_id));
        }
        Ok(post)
    }

    async fn update_with_categories(
        &self,
        post: Post,
        category_ids: &[Uuid],
    ) -> Result<(Post, Vec<Uuid>), RepoError> {
        let mut tables = self.db.tables.write().await;
        if !tables.has_post(post.id) {
            return Err(RepoError::NotFound);
        }
        post.check(&tables)?;
        check_categories(&tables, category_ids)?;

        let existing = tables.category_ids_of(post.id);
        let added: Vec<Uuid> = category_ids
            .iter()
            .filter(|id| !existing.contains(id))
            .copied()
            .collect();

        tables
            .post_categories
            .retain(|link| link.post_id != post.id || category_ids.contains(&link.category_id));
        for category_id in &added {
            tables
                .post_categories
                .push(PostCategory::new(post.id, *category_id));
        }
        if let Some(stored) = tables.posts.iter_mut().find(|p| p.id == post.id) {
            *stored = post.clone();
        }

        Ok((post, added))
    }

    async fn query(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let tables = self.db.tables.read().await;
        let mut matches: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| query.kind.is_none_or(|kind| p.kind == kind))
            .filter(|p| query.filter.matches(p, &tables.category_ids_of(p.id)))
            .cloned()
            .collect();
        sort_posts(&mut matches, query.ordering);

        let total = matches.len() as u64;
        let page = match query.page {
            Some(window) => Page {
                items: matches
                    .into_iter()
                    .skip(window.offset() as usize)
                    .take(window.per_page as usize)
                    .collect(),
                total,
                page: window.page,
                per_page: window.per_page,
            },
            None => Page {
                items: matches,
                total,
                page: 1,
                per_page: total.max(1),
            },
        };
        Ok(page)
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.db.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        sort_posts(&mut posts, PostOrdering::NewestFirst);
        Ok(posts)
    }

    async fn categories_of(&self, post_id: Uuid) -> Result<Vec<Category>, RepoError> {
        let tables = self.db.tables.read().await;
        let ids = tables.category_ids_of(post_id);
        let mut categories: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn adjust_rating(&self, id: Uuid, vote: Vote) -> Result<i64, RepoError> {
        let mut tables = self.db.tables.write().await;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        post.vote(vote);
        Ok(post.rating)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.db.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn adjust_rating(&self, id: Uuid, vote: Vote) -> Result<i64, RepoError> {
        let mut tables = self.db.tables.write().await;
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        comment.vote(vote);
        Ok(comment.rating)
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn subscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<Subscriber, RepoError> {
        let subscriber = Subscriber::new(user_id, category_id);
        let mut tables = self.db.tables.write().await;
        subscriber.check(&tables)?;
        tables.subscribers.push(subscriber);
        Ok(subscriber)
    }

    async fn unsubscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<u64, RepoError> {
        let mut tables = self.db.tables.write().await;
        let before = tables.subscribers.len();
        tables
            .subscribers
            .retain(|s| !(s.user_id == user_id && s.category_id == category_id));
        Ok((before - tables.subscribers.len()) as u64)
    }

    async fn find_by_category(&self, category_id: Uuid) -> Result<Vec<Subscriber>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .subscribers
            .iter()
            .filter(|s| s.category_id == category_id)
            .copied()
            .collect())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Subscriber>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .subscribers
            .iter()
            .filter(|s| s.user_id == user_id)
            .copied()
            .collect())
    }

    async fn count_for(&self, user_id: Uuid, category_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables
            .subscribers
            .iter()
            .filter(|s| s.user_id == user_id && s.category_id == category_id)
            .count() as u64)
    }
}
