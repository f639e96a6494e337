use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author entity - a user allowed to publish, with a derived reputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Recomputed by the rating engine, never edited directly.
    pub rating: i64,
}

impl Author {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            rating: 0,
        }
    }
}

/// An author joined with the display name of its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub author: Author,
    pub username: String,
}
