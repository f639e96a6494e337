//! Category listing, creation and per-category posts.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use portal_core::domain::{CATEGORY_NAME_MAX_LEN, Category};
use portal_core::error::{DomainError, ValidationErrors};
use portal_core::ports::{PostOrdering, PostQuery};
use portal_core::services::PostFilter;
use portal_shared::ApiResponse;
use portal_shared::dto::CreateCategoryRequest;

use super::views::{category_response, post_summary};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /news/categories/
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.repos.categories.list().await?;
    let body: Vec<_> = categories.iter().map(category_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /news/categories/
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let name = body.into_inner().name.trim().to_string();

    let mut errors = ValidationErrors::new();
    if name.is_empty() {
        errors.add_field("name", "This field is required.");
    } else if name.chars().count() > CATEGORY_NAME_MAX_LEN {
        errors.add_field(
            "name",
            format!("Ensure this value has at most {CATEGORY_NAME_MAX_LEN} characters."),
        );
    }
    errors.into_result(())?;

    if state.repos.categories.find_by_name(&name).await?.is_some() {
        return Err(AppError::Conflict(format!("Category {name} already exists")));
    }

    let category = state.repos.categories.save(Category::new(name)).await?;
    tracing::info!(category_id = %category.id, user = %identity.username, "Category created");

    Ok(HttpResponse::Created().json(ApiResponse::ok(category_response(&category))))
}

/// GET /news/categories/{id}/ - every post in the category, newest first.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state
        .repos
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Category", id))?;

    let filter = PostFilter {
        category: Some(id),
        ..PostFilter::default()
    };
    let page = state
        .repos
        .posts
        .query(&PostQuery::new(filter).order_by(PostOrdering::NewestFirst))
        .await?;

    let posts: Vec<_> = page
        .items
        .iter()
        .map(|p| post_summary(p, &state.censor))
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}
