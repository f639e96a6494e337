//! Domain to wire conversions shared by the handlers.

use chrono::Utc;
use portal_core::domain::{AuthorProfile, Category, Comment, Post};
use portal_core::ports::{Page, PageRequest};
use portal_core::services::{Censor, PostForm};
use portal_shared::dto::{
    AuthorResponse, CategoryResponse, CommentResponse, PageQuery, Paginated, PostDetail,
    PostFormRequest, PostSummary,
};

use crate::middleware::error::{AppError, AppResult};

/// Mount point of the post pages.
pub const POSTS_PATH: &str = "/news";

pub fn post_url(post: &Post) -> String {
    format!("{POSTS_PATH}/{}", post.id)
}

pub fn post_summary(post: &Post, censor: &Censor) -> PostSummary {
    PostSummary {
        id: post.id,
        author_id: post.author_id,
        kind: post.kind.code().to_string(),
        kind_label: post.kind.label().to_string(),
        title: censor.censor(&post.title),
        preview: censor.censor(&post.preview()),
        created_at: post.created_at,
        rating: post.rating,
    }
}

pub fn post_detail(
    post: &Post,
    categories: &[Category],
    comments: &[Comment],
    censor: &Censor,
) -> PostDetail {
    PostDetail {
        id: post.id,
        author_id: post.author_id,
        kind: post.kind.code().to_string(),
        kind_label: post.kind.label().to_string(),
        title: censor.censor(&post.title),
        text: censor.censor(&post.text),
        created_at: post.created_at,
        rating: post.rating,
        categories: categories.iter().map(category_response).collect(),
        comments: comments
            .iter()
            .map(|c| comment_response(c, censor))
            .collect(),
    }
}

pub fn category_response(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name.clone(),
    }
}

pub fn comment_response(comment: &Comment, censor: &Censor) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        user_id: comment.user_id,
        text: censor.censor(&comment.text),
        created_at: comment.created_at,
        rating: comment.rating,
    }
}

pub fn author_response(profile: &AuthorProfile) -> AuthorResponse {
    AuthorResponse {
        id: profile.author.id,
        user_id: profile.author.user_id,
        username: profile.username.clone(),
        rating: profile.author.rating,
    }
}

pub fn post_form(request: PostFormRequest) -> PostForm {
    PostForm {
        author_id: request.author_id,
        title: request.title,
        text: request.text,
        categories: request.categories,
    }
}

/// Page window for `?page=N`; zero or negative pages are not found.
pub fn page_request(query: PageQuery, per_page: u64) -> AppResult<PageRequest> {
    Ok(PageRequest::new(query.number()?, per_page))
}

/// Convert a result page, rejecting pages past the end.
pub fn paginated<T, U>(
    page: Page<T>,
    with_time: bool,
    f: impl FnMut(T) -> U,
) -> AppResult<Paginated<U>> {
    if page.is_out_of_range() {
        return Err(AppError::NotFound(format!(
            "Page {} is out of range",
            page.page
        )));
    }

    let num_pages = page.num_pages();
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let page = page.map(f);

    Ok(Paginated {
        items: page.items,
        page: page.page,
        num_pages,
        total: page.total,
        has_next,
        has_previous,
        time_now: with_time.then(Utc::now),
    })
}
