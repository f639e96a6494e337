//! Author registration, listing and reputation.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use portal_core::domain::{Author, AuthorProfile};
use portal_shared::ApiResponse;

use super::views::author_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /news/authors
pub async fn list_authors(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let authors = state.repos.authors.list_profiles().await?;
    let body: Vec<_> = authors.iter().map(author_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /news/authors - the caller becomes an author.
pub async fn become_author(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = state
        .repos
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if state.repos.authors.find_by_user_id(user.id).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "{} is already an author",
            user.username
        )));
    }

    let author = state.repos.authors.save(Author::new(user.id)).await?;
    tracing::info!(author_id = %author.id, user = %user.username, "Author registered");

    let profile = AuthorProfile {
        author,
        username: user.username,
    };
    Ok(HttpResponse::Created().json(ApiResponse::ok(author_response(&profile))))
}

/// POST /news/authors/{id}/rating
pub async fn update_rating(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let author = state.rating.update_rating(path.into_inner()).await?;
    let username = state
        .repos
        .users
        .find_by_id(author.user_id)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();

    let profile = AuthorProfile { author, username };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(author_response(&profile))))
}
