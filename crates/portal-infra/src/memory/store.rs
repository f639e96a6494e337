//! Shared tables behind the in-memory repositories.

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use portal_core::domain::{Author, Category, Comment, Post, PostCategory, Subscriber, User};

/// Every table of the in-memory store. Rows are only reachable through the
/// repositories.
#[derive(Default)]
pub struct Tables {
    pub(crate) users: Vec<User>,
    pub(crate) authors: Vec<Author>,
    pub(crate) categories: Vec<Category>,
    pub(crate) posts: Vec<Post>,
    pub(crate) post_categories: Vec<PostCategory>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) subscribers: Vec<Subscriber>,
}

impl Tables {
    pub(crate) fn has_user(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    pub(crate) fn has_author(&self, id: Uuid) -> bool {
        self.authors.iter().any(|a| a.id == id)
    }

    pub(crate) fn has_category(&self, id: Uuid) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    pub(crate) fn has_post(&self, id: Uuid) -> bool {
        self.posts.iter().any(|p| p.id == id)
    }

    pub(crate) fn category_ids_of(&self, post_id: Uuid) -> Vec<Uuid> {
        self.post_categories
            .iter()
            .filter(|link| link.post_id == post_id)
            .map(|link| link.category_id)
            .collect()
    }

    pub(crate) fn remove_user(&mut self, id: Uuid) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        if self.users.len() == before {
            return false;
        }

        let authors: Vec<Uuid> = self
            .authors
            .iter()
            .filter(|a| a.user_id == id)
            .map(|a| a.id)
            .collect();
        for author_id in authors {
            self.remove_author(author_id);
        }
        self.comments.retain(|c| c.user_id != id);
        self.subscribers.retain(|s| s.user_id != id);
        true
    }

    pub(crate) fn remove_author(&mut self, id: Uuid) -> bool {
        let before = self.authors.len();
        self.authors.retain(|a| a.id != id);
        if self.authors.len() == before {
            return false;
        }

        let posts: Vec<Uuid> = self
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in posts {
            self.remove_post(post_id);
        }
        true
    }

    pub(crate) fn remove_category(&mut self, id: Uuid) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.id != id);
        if self.categories.len() == before {
            return false;
        }

        self.post_categories.retain(|link| link.category_id != id);
        self.subscribers.retain(|s| s.category_id != id);
        true
    }

    pub(crate) fn remove_post(&mut self, id: Uuid) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        if self.posts.len() == before {
            return false;
        }

        self.post_categories.retain(|link| link.post_id != id);
        self.comments.retain(|c| c.post_id != id);
        true
    }
}

/// Process-local database shared by every in-memory repository.
///
/// Used when no `DATABASE_URL` is configured. Data is lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    pub(crate) tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}
