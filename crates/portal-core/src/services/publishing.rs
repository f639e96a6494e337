//! Post creation, editing and deletion.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PostKind};
use crate::error::{DomainError, ValidationErrors};
use crate::ports::{
    AuthorRepository, CategoriesLinked, CategoryRepository, PostEventListener, PostRepository,
};

use super::form::{PostForm, ValidatedPost};

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Runs the publishing flow: validate, persist with links, then raise
/// [`CategoriesLinked`] to the registered listeners.
#[derive(Clone)]
pub struct PublishingService {
    posts: Arc<dyn PostRepository>,
    authors: Arc<dyn AuthorRepository>,
    categories: Arc<dyn CategoryRepository>,
    listeners: Vec<Arc<dyn PostEventListener>>,
}

impl PublishingService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        authors: Arc<dyn AuthorRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            posts,
            authors,
            categories,
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn PostEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Validate and store a new post. The kind comes from the caller's entry
    /// point, never from the submission.
    pub async fn create(&self, kind: PostKind, form: PostForm) -> Result<Post, DomainError> {
        let validated = form.validate()?;
        self.check_choices(&validated).await?;

        let (post, categories) = validated.into_post(kind);
        let post = self.posts.create_with_categories(post, &categories).await?;

        tracing::info!(
            post_id = %post.id,
            kind = post.kind.code(),
            categories = categories.len(),
            "Post created"
        );

        self.publish(CategoriesLinked {
            post_id: post.id,
            added: categories,
        })
        .await;

        Ok(post)
    }

    /// Validate and apply an edit. Kind and creation time are preserved;
    /// listeners only hear about it when new category links were added.
    pub async fn edit(&self, id: Uuid, form: PostForm) -> Result<Post, DomainError> {
        let existing = self.get(id).await?;

        let validated = form.validate()?;
        self.check_choices(&validated).await?;

        let (post, categories) = validated.apply_to(existing);
        let (post, added) = self.posts.update_with_categories(post, &categories).await?;

        tracing::info!(post_id = %post.id, added = added.len(), "Post updated");

        if !added.is_empty() {
            self.publish(CategoriesLinked {
                post_id: post.id,
                added,
            })
            .await;
        }

        Ok(post)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.get(id).await?;
        self.posts.delete(id).await?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    async fn check_choices(&self, validated: &ValidatedPost) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();

        if self.authors.find_by_id(validated.author_id).await?.is_none() {
            errors.add_field("author_id", INVALID_CHOICE);
        }

        for category_id in &validated.categories {
            if self.categories.find_by_id(*category_id).await?.is_none() {
                errors.add_field(
                    "categories",
                    format!("Select a valid choice. {category_id} is not one of the available choices."),
                );
            }
        }

        errors.into_result(()).map_err(DomainError::from)
    }

    async fn publish(&self, event: CategoriesLinked) {
        for listener in &self.listeners {
            listener.categories_linked(&event).await;
        }
    }
}
