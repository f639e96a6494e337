//! Comments on posts and their ratings.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use portal_core::domain::{Comment, Vote};
use portal_core::error::{DomainError, RepoError, ValidationErrors};
use portal_shared::ApiResponse;
use portal_shared::dto::{CreateCommentRequest, RatingResponse};

use super::views::comment_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /news/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let post = state.publishing.get(path.into_inner()).await?;
    let text = body.into_inner().text;

    let mut errors = ValidationErrors::new();
    if text.trim().is_empty() {
        errors.add_field("text", "This field is required.");
    }
    errors.into_result(())?;

    let comment = state
        .repos
        .comments
        .save(Comment::new(post.id, identity.user_id, text))
        .await?;
    tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment added");

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment_response(
        &comment,
        &state.censor,
    ))))
}

async fn rate(state: &AppState, id: Uuid, vote: Vote) -> AppResult<HttpResponse> {
    let rating = state
        .repos
        .comments
        .adjust_rating(id, vote)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Comment", id),
            other => other.into(),
        })?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(RatingResponse { id, rating })))
}

/// POST /news/comments/{id}/like
pub async fn like_comment(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    rate(&state, path.into_inner(), Vote::Like).await
}

/// POST /news/comments/{id}/dislike
pub async fn dislike_comment(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    rate(&state, path.into_inner(), Vote::Dislike).await
}
