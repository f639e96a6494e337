use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Vote;

/// Number of body characters shown in a post preview.
const PREVIEW_CHARS: usize = 123;

/// Kind of publication, fixed by the entry point that created the post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostKind {
    #[serde(rename = "NW")]
    News,
    #[default]
    #[serde(rename = "AR")]
    Article,
}

impl PostKind {
    /// Two-letter storage code.
    pub fn code(self) -> &'static str {
        match self {
            PostKind::News => "NW",
            PostKind::Article => "AR",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            PostKind::News => "News",
            PostKind::Article => "Article",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NW" => Ok(PostKind::News),
            "AR" => Ok(PostKind::Article),
            other => Err(format!("unknown post kind: {other}")),
        }
    }
}

/// Post entity - a news item or an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub kind: PostKind,
    /// Set once on creation.
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub text: String,
    pub rating: i64,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, kind: PostKind, title: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            kind,
            created_at: Utc::now(),
            title,
            text,
            rating: 0,
        }
    }

    pub fn like(&mut self) {
        self.rating += 1;
    }

    pub fn dislike(&mut self) {
        self.rating -= 1;
    }

    pub fn vote(&mut self, vote: Vote) {
        match vote {
            Vote::Like => self.like(),
            Vote::Dislike => self.dislike(),
        }
    }

    /// Leading part of the body followed by an ellipsis.
    pub fn preview(&self) -> String {
        let head: String = self.text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_defaults() {
        let author_id = Uuid::new_v4();
        let post = Post::new(author_id, PostKind::News, "Title".into(), "Body".into());

        assert_eq!(post.author_id, author_id);
        assert_eq!(post.kind, PostKind::News);
        assert_eq!(post.rating, 0);
    }

    #[test]
    fn test_like_and_dislike() {
        let mut post = Post::new(Uuid::new_v4(), PostKind::Article, "t".into(), "b".into());
        post.like();
        post.like();
        post.dislike();
        assert_eq!(post.rating, 1);

        post.vote(Vote::Dislike);
        post.vote(Vote::Dislike);
        assert_eq!(post.rating, -1);
    }

    #[test]
    fn test_preview_truncates_by_characters() {
        let text = "ж".repeat(200);
        let post = Post::new(Uuid::new_v4(), PostKind::Article, "t".into(), text);

        let preview = post.preview();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 123 + 3);
    }

    #[test]
    fn test_kind_codes_round_trip() {
        assert_eq!("NW".parse::<PostKind>(), Ok(PostKind::News));
        assert_eq!(PostKind::Article.code(), "AR");
        assert!("XX".parse::<PostKind>().is_err());
    }
}
