//! Query descriptions handed to repositories.

use serde::Serialize;

use crate::domain::PostKind;
use crate::services::filter::PostFilter;

/// Sort order for post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// A 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

/// One page of results plus the size of the whole result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn num_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether the requested page lies outside the result set.
    ///
    /// Page 1 of an empty listing is valid.
    pub fn is_out_of_range(&self) -> bool {
        self.page > self.num_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// A lazily evaluated post query: nothing runs until a repository executes it.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub kind: Option<PostKind>,
    pub ordering: PostOrdering,
    /// `None` returns every match.
    pub page: Option<PageRequest>,
}

impl PostQuery {
    pub fn new(filter: PostFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: PostKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn order_by(mut self, ordering: PostOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }
}
