//! Domain events raised by the publishing flow.

use async_trait::async_trait;
use uuid::Uuid;

/// Raised once a post's category links have been committed and at least one
/// link was added. Removing links alone never raises it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoriesLinked {
    pub post_id: Uuid,
    /// Categories whose links were added by the triggering write.
    pub added: Vec<Uuid>,
}

/// Consumer of post lifecycle events.
///
/// Listeners run synchronously on the publishing path and must not fail it,
/// so they report problems through logging only.
#[async_trait]
pub trait PostEventListener: Send + Sync {
    async fn categories_linked(&self, event: &CategoriesLinked);
}
