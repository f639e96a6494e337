//! Post submission validation.

use uuid::Uuid;

use crate::domain::{Post, PostKind};
use crate::error::ValidationErrors;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 255;

const REQUIRED: &str = "This field is required.";

/// Raw post submission as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub author_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub categories: Vec<Uuid>,
}

/// A submission that passed validation but is not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPost {
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub categories: Vec<Uuid>,
}

impl PostForm {
    /// Check presence, length and the title/body rule.
    ///
    /// Title and text are trimmed first; every check and the validated
    /// result see the trimmed values.
    ///
    /// Whether the referenced author and categories exist is checked by the
    /// publishing service, which owns the repositories.
    pub fn validate(self) -> Result<ValidatedPost, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = self.title.trim().to_string();
        let text = self.text.trim().to_string();

        if self.author_id.is_none() {
            errors.add_field("author_id", REQUIRED);
        }

        if title.is_empty() {
            errors.add_field("title", REQUIRED);
        } else {
            let length = title.chars().count();
            if length > TITLE_MAX_CHARS {
                errors.add_field(
                    "title",
                    format!(
                        "Ensure this value has at most {TITLE_MAX_CHARS} characters (it has {length})."
                    ),
                );
            }
        }

        if text.is_empty() {
            errors.add_field("text", REQUIRED);
        }

        if self.categories.is_empty() {
            errors.add_field("categories", REQUIRED);
        }

        if !title.is_empty() && title == text {
            errors.add_non_field("Post text must not be identical to the title.");
        }

        let mut categories = self.categories;
        dedup_preserving_order(&mut categories);

        match (errors.is_empty(), self.author_id) {
            (true, Some(author_id)) => Ok(ValidatedPost {
                author_id,
                title,
                text,
                categories,
            }),
            _ => Err(errors),
        }
    }
}

impl ValidatedPost {
    /// Materialise a new post of the given kind.
    pub fn into_post(self, kind: PostKind) -> (Post, Vec<Uuid>) {
        let post = Post::new(self.author_id, kind, self.title, self.text);
        (post, self.categories)
    }

    /// Apply the submission to an existing post, keeping its id, kind,
    /// creation time and rating.
    pub fn apply_to(self, mut post: Post) -> (Post, Vec<Uuid>) {
        post.author_id = self.author_id;
        post.title = self.title;
        post.text = self.text;
        (post, self.categories)
    }
}

fn dedup_preserving_order(ids: &mut Vec<Uuid>) {
    let mut seen = Vec::with_capacity(ids.len());
    ids.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(*id);
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, text: &str) -> PostForm {
        PostForm {
            author_id: Some(Uuid::new_v4()),
            title: title.to_string(),
            text: text.to_string(),
            categories: vec![Uuid::new_v4()],
        }
    }

    #[test]
    fn test_title_equal_to_text_is_rejected() {
        let errors = form("Hello", "Hello").validate().unwrap_err();
        assert_eq!(errors.non_field.len(), 1);
        assert!(errors.fields.is_empty());
    }

    #[test]
    fn test_title_equal_to_padded_text_is_rejected() {
        let errors = form("Hello", "Hello\n").validate().unwrap_err();
        assert_eq!(errors.non_field.len(), 1);

        assert!(form("  Hello ", "Hello").validate().is_err());
    }

    #[test]
    fn test_surrounding_whitespace_is_stripped() {
        let validated = form("  Hello\t", "\nWorld  ").validate().unwrap();
        assert_eq!(validated.title, "Hello");
        assert_eq!(validated.text, "World");

        let padded = format!("  {}  ", "a".repeat(TITLE_MAX_CHARS));
        assert!(form(&padded, "body").validate().is_ok());
    }

    #[test]
    fn test_distinct_title_and_text_are_accepted() {
        let validated = form("Hello", "World").validate().unwrap();
        assert_eq!(validated.title, "Hello");
        assert_eq!(validated.text, "World");
        assert_eq!(validated.categories.len(), 1);
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let errors = PostForm::default().validate().unwrap_err();
        assert!(errors.has_field("author_id"));
        assert!(errors.has_field("title"));
        assert!(errors.has_field("text"));
        assert!(errors.has_field("categories"));
    }

    #[test]
    fn test_title_length_counts_characters() {
        let at_limit = "я".repeat(TITLE_MAX_CHARS);
        assert!(form(&at_limit, "body").validate().is_ok());

        let too_long = "я".repeat(TITLE_MAX_CHARS + 1);
        let errors = form(&too_long, "body").validate().unwrap_err();
        assert!(errors.has_field("title"));
    }

    #[test]
    fn test_duplicate_categories_are_collapsed() {
        let category = Uuid::new_v4();
        let mut submission = form("Title", "Body");
        submission.categories = vec![category, category];

        let validated = submission.validate().unwrap();
        assert_eq!(validated.categories, vec![category]);
    }

    #[test]
    fn test_apply_keeps_identity_and_kind() {
        let original = Post::new(Uuid::new_v4(), PostKind::News, "Old".into(), "Old body".into());
        let (updated, _) = form("New", "New body").validate().unwrap().apply_to(original.clone());

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.kind, PostKind::News);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.title, "New");
    }
}
