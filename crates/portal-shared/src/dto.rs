//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Submitted post fields. Missing fields are reported by validation rather
/// than by deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFormRequest {
    pub author_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub categories: Vec<Uuid>,
}

/// A post as shown in listings: censored title and a short preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub author_id: Uuid,
    /// Stored code, `NW` or `AR`.
    pub kind: String,
    pub kind_label: String,
    pub title: String,
    pub preview: String,
    pub created_at: DateTime<Utc>,
    pub rating: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: Uuid,
    pub author_id: Uuid,
    pub kind: String,
    pub kind_label: String,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub rating: i64,
    pub categories: Vec<CategoryResponse>,
    pub comments: Vec<CommentResponse>,
}

/// Context for rendering the edit form: the post plus every choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEditContext {
    pub post: PostDetail,
    pub available_categories: Vec<CategoryResponse>,
    pub available_authors: Vec<AuthorResponse>,
}

/// Context for the delete confirmation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDeleteContext {
    pub post: PostSummary,
    pub success_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDeletedResponse {
    pub id: Uuid,
    pub success_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingResponse {
    pub id: Uuid,
    pub rating: i64,
}

// ---------------------------------------------------------------------------
// Authors, categories, comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub rating: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub rating: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    pub id: Uuid,
    pub name: String,
    pub user_subscribed: bool,
}

/// Subscription overview with the token the toggle form must echo back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionsPage {
    pub categories: Vec<SubscriptionEntry>,
    pub csrf_token: String,
}

/// Form-encoded subscription toggle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionForm {
    pub category_id: String,
    pub action: String,
    pub csrf_token: String,
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// `?page=N`, 1-based. Kept as text so that a malformed value is reported
/// like any other bad page instead of failing query extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// The requested page is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid page number: {0}")]
pub struct InvalidPage(pub String);

impl PageQuery {
    pub fn number(&self) -> Result<u64, InvalidPage> {
        let Some(raw) = self.page.as_deref() else {
            return Ok(1);
        };

        match raw.trim().parse::<u64>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(InvalidPage(raw.to_string())),
        }
    }
}

/// Raw search criteria; parsing and validation happen server side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub title: Option<String>,
    #[serde(alias = "postCategory")]
    pub category: Option<String>,
    #[serde(alias = "datePost")]
    pub date_after: Option<String>,
    pub page: Option<String>,
}

impl SearchParams {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.clone(),
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
    /// Server time, included by the general listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_now: Option<DateTime<Utc>>,
}
