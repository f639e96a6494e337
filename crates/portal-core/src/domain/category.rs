use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a category name.
pub const CATEGORY_NAME_MAX_LEN: usize = 128;

/// Category entity - a named, subscribable grouping of posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

/// Link between a post and one of its categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCategory {
    pub id: Uuid,
    pub post_id: Uuid,
    pub category_id: Uuid,
}

impl PostCategory {
    pub fn new(post_id: Uuid, category_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            category_id,
        }
    }
}
