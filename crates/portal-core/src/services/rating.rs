//! Author reputation.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Author;
use crate::error::DomainError;
use crate::ports::{AuthorRepository, CommentRepository, PostRepository};

/// Weight of post ratings relative to comment ratings.
pub const POST_RATING_WEIGHT: i64 = 3;

/// `3 × Σ post ratings + Σ comment ratings`; empty inputs contribute zero.
pub fn compute_reputation(
    post_ratings: impl IntoIterator<Item = i64>,
    comment_ratings: impl IntoIterator<Item = i64>,
) -> i64 {
    let posts: i64 = post_ratings.into_iter().sum();
    let comments: i64 = comment_ratings.into_iter().sum();
    posts * POST_RATING_WEIGHT + comments
}

/// Recomputes and stores author reputation on demand.
#[derive(Clone)]
pub struct RatingService {
    authors: Arc<dyn AuthorRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl RatingService {
    pub fn new(
        authors: Arc<dyn AuthorRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            authors,
            posts,
            comments,
        }
    }

    /// Recompute the author's reputation from the posts it owns and the
    /// comments its user wrote, then persist it.
    pub async fn update_rating(&self, author_id: Uuid) -> Result<Author, DomainError> {
        let mut author = self
            .authors
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Author", author_id))?;

        let posts = self.posts.find_by_author(author.id).await?;
        let comments = self.comments.find_by_user(author.user_id).await?;

        let rating = compute_reputation(
            posts.iter().map(|p| p.rating),
            comments.iter().map(|c| c.rating),
        );
        self.authors.set_rating(author.id, rating).await?;

        tracing::debug!(
            author_id = %author.id,
            posts = posts.len(),
            comments = comments.len(),
            rating,
            "Author rating updated"
        );

        author.rating = rating;
        Ok(author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_posts_three_times() {
        assert_eq!(compute_reputation([2, 3], [1, -1, 4]), 19);
    }

    #[test]
    fn test_empty_sides_count_as_zero() {
        assert_eq!(compute_reputation([], [5]), 5);
        assert_eq!(compute_reputation([5], []), 15);
        assert_eq!(compute_reputation([], []), 0);
    }

    #[test]
    fn test_negative_ratings() {
        assert_eq!(compute_reputation([-2], [-1]), -7);
    }
}
