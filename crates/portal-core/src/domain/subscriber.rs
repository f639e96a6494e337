use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's subscription to new posts in a category.
///
/// The (user, category) pair is not unique: subscribing twice stores two rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
}

impl Subscriber {
    pub fn new(user_id: Uuid, category_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id,
        }
    }
}
