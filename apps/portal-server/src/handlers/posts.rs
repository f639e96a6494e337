//! Post listings, detail, publishing and rating.

use actix_web::{HttpResponse, http::header, web};
use uuid::Uuid;

use portal_core::domain::{Post, PostKind, Vote};
use portal_core::ports::{PostOrdering, PostQuery};
use portal_core::services::PostFilter;
use portal_shared::ApiResponse;
use portal_shared::dto::{
    PageQuery, PostDeleteContext, PostDeletedResponse, PostEditContext, PostFormRequest,
    RatingResponse, SearchParams,
};

use super::views::{
    POSTS_PATH, author_response, category_response, page_request, paginated, post_detail,
    post_form, post_summary, post_url,
};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Page size of the main listing.
const LIST_PAGE_SIZE: u64 = 10;
/// Page size of the per-kind listings and search.
const KIND_PAGE_SIZE: u64 = 5;

async fn listing(
    state: &AppState,
    query: PostQuery,
    with_time: bool,
) -> AppResult<HttpResponse> {
    let page = state.repos.posts.query(&query).await?;
    let listing = paginated(page, with_time, |post| post_summary(&post, &state.censor))?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(listing)))
}

/// GET /news/
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let window = page_request(query.into_inner(), LIST_PAGE_SIZE)?;
    let query = PostQuery::new(PostFilter::default())
        .order_by(PostOrdering::NewestFirst)
        .paginate(window);
    listing(&state, query, true).await
}

/// GET /news/news/
pub async fn list_news(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    list_kind(&state, PostKind::News, query.into_inner()).await
}

/// GET /news/article/
pub async fn list_articles(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    list_kind(&state, PostKind::Article, query.into_inner()).await
}

async fn list_kind(state: &AppState, kind: PostKind, page: PageQuery) -> AppResult<HttpResponse> {
    let window = page_request(page, KIND_PAGE_SIZE)?;
    let query = PostQuery::new(PostFilter::default())
        .kind(kind)
        .order_by(PostOrdering::NewestFirst)
        .paginate(window);
    listing(state, query, true).await
}

/// GET /news/search/
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let filter = PostFilter::parse(
        params.title.as_deref(),
        params.category.as_deref(),
        params.date_after.as_deref(),
    )?;
    tracing::debug!(?filter, "Searching posts");

    let window = page_request(params.page_query(), KIND_PAGE_SIZE)?;
    let query = PostQuery::new(filter)
        .order_by(PostOrdering::NewestFirst)
        .paginate(window);
    listing(&state, query, false).await
}

async fn detail_response(state: &AppState, post: &Post) -> AppResult<HttpResponse> {
    let categories = state.repos.posts.categories_of(post.id).await?;
    let comments = state.repos.comments.find_by_post(post.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_detail(
        post,
        &categories,
        &comments,
        &state.censor,
    ))))
}

/// GET /news/{id}
pub async fn get_post(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.publishing.get(path.into_inner()).await?;
    detail_response(&state, &post).await
}

async fn create(
    state: &AppState,
    identity: &Identity,
    kind: PostKind,
    body: PostFormRequest,
) -> AppResult<HttpResponse> {
    let post = state.publishing.create(kind, post_form(body)).await?;
    tracing::info!(
        post_id = %post.id,
        kind = kind.code(),
        user = %identity.username,
        "Post published"
    );

    let categories = state.repos.posts.categories_of(post.id).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, post_url(&post)))
        .json(ApiResponse::ok(post_detail(
            &post,
            &categories,
            &[],
            &state.censor,
        ))))
}

/// POST /news/create/
pub async fn create_news(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostFormRequest>,
) -> AppResult<HttpResponse> {
    create(&state, &identity, PostKind::News, body.into_inner()).await
}

/// POST /news/article/create/
pub async fn create_article(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostFormRequest>,
) -> AppResult<HttpResponse> {
    create(&state, &identity, PostKind::Article, body.into_inner()).await
}

/// GET /news/{id}/edit
pub async fn edit_form(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.publishing.get(path.into_inner()).await?;
    let categories = state.repos.posts.categories_of(post.id).await?;
    let available_categories = state.repos.categories.list().await?;
    let available_authors = state.repos.authors.list_profiles().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostEditContext {
        post: post_detail(&post, &categories, &[], &state.censor),
        available_categories: available_categories.iter().map(category_response).collect(),
        available_authors: available_authors.iter().map(author_response).collect(),
    })))
}

/// POST /news/{id}/edit
pub async fn edit_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostFormRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .publishing
        .edit(path.into_inner(), post_form(body.into_inner()))
        .await?;
    tracing::info!(post_id = %post.id, user = %identity.username, "Post edited");
    detail_response(&state, &post).await
}

/// GET /news/{id}/delete
pub async fn delete_form(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.publishing.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDeleteContext {
        post: post_summary(&post, &state.censor),
        success_url: format!("{POSTS_PATH}/"),
    })))
}

/// POST /news/{id}/delete
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.publishing.delete(id).await?;
    tracing::info!(post_id = %id, user = %identity.username, "Post removed");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        PostDeletedResponse {
            id,
            success_url: format!("{POSTS_PATH}/"),
        },
        "Post deleted",
    )))
}

async fn rate(state: &AppState, id: Uuid, vote: Vote) -> AppResult<HttpResponse> {
    let rating = state.repos.posts.adjust_rating(id, vote).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(RatingResponse { id, rating })))
}

/// POST /news/{id}/like
pub async fn like_post(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    rate(&state, path.into_inner(), Vote::Like).await
}

/// POST /news/{id}/dislike
pub async fn dislike_post(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    rate(&state, path.into_inner(), Vote::Dislike).await
}
