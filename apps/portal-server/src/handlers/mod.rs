//! HTTP handlers and route configuration.

mod auth;
mod authors;
mod categories;
mod comments;
mod health;
mod posts;
mod subscriptions;
mod views;

use actix_web::web;

pub use views::POSTS_PATH;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            ),
    )
    .service(
        web::resource("/subscriptions/")
            .route(web::get().to(subscriptions::subscriptions))
            .route(web::post().to(subscriptions::toggle_subscription)),
    )
    .service(posts_scope());
}

/// Portal pages. Fixed paths are registered before `/{id}`.
fn posts_scope() -> actix_web::Scope {
    web::scope(POSTS_PATH)
        .route("/", web::get().to(posts::list_posts))
        .route("/news/", web::get().to(posts::list_news))
        .route("/article/", web::get().to(posts::list_articles))
        .route("/search/", web::get().to(posts::search))
        .route("/create/", web::post().to(posts::create_news))
        .route("/article/create/", web::post().to(posts::create_article))
        .service(
            web::resource("/article/{id}/edit")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_post)),
        )
        .service(
            web::resource("/article/{id}/delete")
                .route(web::get().to(posts::delete_form))
                .route(web::post().to(posts::delete_post)),
        )
        // Authors
        .service(
            web::resource("/authors")
                .route(web::get().to(authors::list_authors))
                .route(web::post().to(authors::become_author)),
        )
        .route("/authors/{id}/rating", web::post().to(authors::update_rating))
        // Categories
        .service(
            web::resource("/categories/")
                .route(web::get().to(categories::list_categories))
                .route(web::post().to(categories::create_category)),
        )
        .route("/categories/{id}/", web::get().to(categories::category_posts))
        // Comments
        .route("/comments/{id}/like", web::post().to(comments::like_comment))
        .route(
            "/comments/{id}/dislike",
            web::post().to(comments::dislike_comment),
        )
        // Single post
        .route("/{id}", web::get().to(posts::get_post))
        .service(
            web::resource("/{id}/edit")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_post)),
        )
        .service(
            web::resource("/{id}/delete")
                .route(web::get().to(posts::delete_form))
                .route(web::post().to(posts::delete_post)),
        )
        .route("/{id}/like", web::post().to(posts::like_post))
        .route("/{id}/dislike", web::post().to(posts::dislike_post))
        .route("/{id}/comments", web::post().to(comments::add_comment))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test, web};
    use uuid::Uuid;

    use portal_core::domain::{Author, Category, User};
    use portal_core::ports::{PasswordService, TokenService};
    use portal_infra::RecordingMailer;
    use portal_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use portal_shared::dto::{
        AuthResponse, AuthorResponse, CategoryResponse, Paginated, PostDeletedResponse,
        PostDetail, PostFormRequest, PostSummary, RatingResponse, SubscriptionForm,
        SubscriptionsPage, UserResponse,
    };
    use portal_shared::{ApiResponse, ErrorResponse};

    use super::configure_routes;
    use crate::config::AppConfig;
    use crate::state::{AppState, Repositories};

    fn token_service() -> Arc<dyn TokenService> {
        Arc::new(JwtTokenService::new(JwtConfig::default()))
    }

    fn password_service() -> Arc<dyn PasswordService> {
        Arc::new(Argon2PasswordService::new())
    }

    fn state_with(mailer: &RecordingMailer) -> AppState {
        AppState::assemble(
            Repositories::in_memory(),
            Arc::new(mailer.clone()),
            &AppConfig::default(),
        )
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .app_data(web::Data::new(token_service()))
                    .app_data(web::Data::new(password_service()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    async fn user(state: &AppState, name: &str) -> User {
        state
            .repos
            .users
            .save(User::new(
                name.to_string(),
                format!("{name}@example.com"),
                "hash".to_string(),
            ))
            .await
            .unwrap()
    }

    async fn author(state: &AppState, name: &str) -> (User, Author) {
        let user = user(state, name).await;
        let author = state.repos.authors.save(Author::new(user.id)).await.unwrap();
        (user, author)
    }

    async fn category(state: &AppState, name: &str) -> Category {
        state
            .repos
            .categories
            .save(Category::new(name.to_string()))
            .await
            .unwrap()
    }

    fn bearer(user: &User) -> (header::HeaderName, String) {
        let token = token_service()
            .generate_token(user.id, &user.username, &user.email)
            .unwrap();
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    fn form(author: &Author, categories: &[&Category], title: &str) -> PostFormRequest {
        PostFormRequest {
            author_id: Some(author.id),
            title: title.to_string(),
            text: format!("{title} in detail"),
            categories: categories.iter().map(|c| c.id).collect(),
        }
    }

    #[actix_rt::test]
    async fn test_health_reports_storage() {
        let state = state_with(&RecordingMailer::new());
        let app = test_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/health").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }

    #[actix_rt::test]
    async fn test_register_login_and_me() {
        let state = state_with(&RecordingMailer::new());
        let app = test_app!(state);

        let register = serde_json::json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct horse",
        });
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&register)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&register)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({
                "email": "alice@example.com",
                "password": "correct horse",
            }))
            .to_request();
        let auth: AuthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(auth.token_type, "Bearer");
        assert_eq!(auth.expires_in, 86400);

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", auth.access_token),
            ))
            .to_request();
        let me: UserResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me.username, "alice");
    }

    #[actix_rt::test]
    async fn test_register_rejects_short_password() {
        let state = state_with(&RecordingMailer::new());
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "short",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let problem: ErrorResponse = test::read_body_json(res).await;
        assert!(problem.errors.unwrap().contains_key("password"));
    }

    #[actix_rt::test]
    async fn test_wrong_password_is_unauthorized() {
        let state = state_with(&RecordingMailer::new());
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": "long enough",
            }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({
                "email": "carol@example.com",
                "password": "not the one",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_create_requires_authentication() {
        let state = state_with(&RecordingMailer::new());
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/news/create/")
            .set_json(PostFormRequest::default())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_create_news_notifies_subscribers() {
        let mailer = RecordingMailer::new();
        let state = state_with(&mailer);
        let (writer, author) = author(&state, "writer").await;
        let sport = category(&state, "Sport").await;
        let reader = user(&state, "reader").await;
        state
            .repos
            .subscribers
            .subscribe(reader.id, sport.id)
            .await
            .unwrap();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/news/create/")
            .insert_header(bearer(&writer))
            .set_json(form(&author, &[&sport], "Cup final"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let location = res.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        let location = location.to_string();
        let body: ApiResponse<PostDetail> = test::read_body_json(res).await;
        let post = body.data.unwrap();
        assert_eq!(location, format!("/news/{}", post.id));
        assert_eq!(post.kind, "NW");
        assert_eq!(post.categories[0].name, "Sport");

        let sent = mailer.messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec![reader.email.clone()]);
    }

    #[actix_rt::test]
    async fn test_article_entry_point_sets_kind() {
        let state = state_with(&RecordingMailer::new());
        let (writer, author) = author(&state, "writer").await;
        let science = category(&state, "Science").await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/news/article/create/")
            .insert_header(bearer(&writer))
            .set_json(form(&author, &[&science], "Long read"))
            .to_request();
        let body: ApiResponse<PostDetail> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap().kind, "AR");

        let req = test::TestRequest::get().uri("/news/article/").to_request();
        let body: ApiResponse<Paginated<PostSummary>> =
            test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap().total, 1);

        let req = test::TestRequest::get().uri("/news/news/").to_request();
        let body: ApiResponse<Paginated<PostSummary>> =
            test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap().total, 0);
    }

    #[actix_rt::test]
    async fn test_invalid_form_lists_field_errors() {
        let state = state_with(&RecordingMailer::new());
        let (writer, author) = author(&state, "writer").await;
        let app = test_app!(state);

        let mut body = form(&author, &[], "Same");
        body.text = body.title.clone();
        let req = test::TestRequest::post()
            .uri("/news/create/")
            .insert_header(bearer(&writer))
            .set_json(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let problem: ErrorResponse = test::read_body_json(res).await;
        assert!(problem.errors.unwrap().contains_key("categories"));
        assert_eq!(problem.non_field_errors.unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_listing_pagination_bounds() {
        let state = state_with(&RecordingMailer::new());
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/news/").to_request();
        let body: ApiResponse<Paginated<PostSummary>> =
            test::call_and_read_body_json(&app, req).await;
        let listing = body.data.unwrap();
        assert!(listing.items.is_empty());
        assert!(listing.time_now.is_some());

        for uri in [
            "/news/?page=0",
            "/news/?page=2",
            "/news/?page=abc",
            "/news/news/?page=abc",
            "/news/search/?page=-1",
        ] {
            let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_rt::test]
    async fn test_search_filters_and_validates() {
        let state = state_with(&RecordingMailer::new());
        let (writer, author) = author(&state, "writer").await;
        let sport = category(&state, "Sport").await;
        let politics = category(&state, "Politics").await;
        let app = test_app!(state);

        for (title, cat) in [("Cup final", &sport), ("Elections", &politics)] {
            let req = test::TestRequest::post()
                .uri("/news/create/")
                .insert_header(bearer(&writer))
                .set_json(form(&author, &[cat], title))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri(&format!("/news/search/?title=CUP&category={}", sport.id))
            .to_request();
        let body: ApiResponse<Paginated<PostSummary>> =
            test::call_and_read_body_json(&app, req).await;
        let listing = body.data.unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.items[0].title, "Cup final");
        assert!(listing.time_now.is_none());

        let req = test::TestRequest::get()
            .uri("/news/search/?datePost=yesterday")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_rt::test]
    async fn test_detail_edit_and_delete() {
        let mailer = RecordingMailer::new();
        let state = state_with(&mailer);
        let (writer, author) = author(&state, "writer").await;
        let sport = category(&state, "Sport").await;
        let economy = category(&state, "Economy").await;
        let reader = user(&state, "reader").await;
        state
            .repos
            .subscribers
            .subscribe(reader.id, economy.id)
            .await
            .unwrap();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/news/create/")
            .insert_header(bearer(&writer))
            .set_json(form(&author, &[&sport], "Cup final"))
            .to_request();
        let created: ApiResponse<PostDetail> = test::call_and_read_body_json(&app, req).await;
        let id = created.data.unwrap().id;
        assert!(mailer.messages().await.is_empty());

        let req = test::TestRequest::post()
            .uri(&format!("/news/{id}/edit"))
            .insert_header(bearer(&writer))
            .set_json(form(&author, &[&sport, &economy], "Cup final, revisited"))
            .to_request();
        let edited: ApiResponse<PostDetail> = test::call_and_read_body_json(&app, req).await;
        let edited = edited.data.unwrap();
        assert_eq!(edited.kind, "NW");
        assert_eq!(edited.categories.len(), 2);
        assert_eq!(mailer.messages().await.len(), 1);

        let req = test::TestRequest::post()
            .uri(&format!("/news/{id}/delete"))
            .insert_header(bearer(&writer))
            .to_request();
        let deleted: ApiResponse<PostDeletedResponse> =
            test::call_and_read_body_json(&app, req).await;
        assert_eq!(deleted.data.unwrap().success_url, "/news/");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/news/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_unknown_ids_are_not_found() {
        let state = state_with(&RecordingMailer::new());
        let app = test_app!(state);

        for uri in [
            format!("/news/{}", Uuid::new_v4()),
            format!("/news/categories/{}/", Uuid::new_v4()),
            "/news/not-a-uuid".to_string(),
        ] {
            let res =
                test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[actix_rt::test]
    async fn test_likes_comments_and_reputation() {
        let state = state_with(&RecordingMailer::new());
        let (writer, author) = author(&state, "writer").await;
        let sport = category(&state, "Sport").await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/news/create/")
            .insert_header(bearer(&writer))
            .set_json(form(&author, &[&sport], "Cup final"))
            .to_request();
        let created: ApiResponse<PostDetail> = test::call_and_read_body_json(&app, req).await;
        let id = created.data.unwrap().id;

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri(&format!("/news/{id}/like"))
                .insert_header(bearer(&writer))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::post()
            .uri(&format!("/news/{id}/comments"))
            .insert_header(bearer(&writer))
            .set_json(serde_json::json!({ "text": "Great match" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let comment: ApiResponse<serde_json::Value> = test::read_body_json(res).await;
        let comment_id = comment.data.unwrap()["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/news/comments/{comment_id}/like"))
            .insert_header(bearer(&writer))
            .to_request();
        let rating: ApiResponse<RatingResponse> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rating.data.unwrap().rating, 1);

        let req = test::TestRequest::post()
            .uri(&format!("/news/authors/{}/rating", author.id))
            .insert_header(bearer(&writer))
            .to_request();
        let body: ApiResponse<AuthorResponse> = test::call_and_read_body_json(&app, req).await;
        let profile = body.data.unwrap();
        assert_eq!(profile.rating, 7);
        assert_eq!(profile.username, "writer");
    }

    #[actix_rt::test]
    async fn test_categories_and_authors() {
        let state = state_with(&RecordingMailer::new());
        let newcomer = user(&state, "newcomer").await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/news/categories/")
            .insert_header(bearer(&newcomer))
            .set_json(serde_json::json!({ "name": "Culture" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/news/categories/")
            .insert_header(bearer(&newcomer))
            .set_json(serde_json::json!({ "name": "Culture" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/news/categories/")
            .insert_header(bearer(&newcomer))
            .set_json(serde_json::json!({ "name": "x".repeat(129) }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let problem: ErrorResponse = test::read_body_json(res).await;
        assert!(problem.errors.unwrap().contains_key("name"));

        let req = test::TestRequest::post()
            .uri("/news/categories/")
            .insert_header(bearer(&newcomer))
            .set_json(serde_json::json!({ "name": "x".repeat(128) }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/news/categories/").to_request();
        let body: ApiResponse<Vec<CategoryResponse>> =
            test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap().len(), 2);

        let req = test::TestRequest::post()
            .uri("/news/authors")
            .insert_header(bearer(&newcomer))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/news/authors")
            .insert_header(bearer(&newcomer))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get().uri("/news/authors").to_request();
        let body: ApiResponse<Vec<AuthorResponse>> =
            test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap()[0].username, "newcomer");
    }

    #[actix_rt::test]
    async fn test_subscription_toggle_checks_csrf() {
        let state = state_with(&RecordingMailer::new());
        let reader = user(&state, "reader").await;
        let sport = category(&state, "Sport").await;
        let app = test_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/subscriptions/").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/subscriptions/")
            .insert_header(bearer(&reader))
            .to_request();
        let page: ApiResponse<SubscriptionsPage> = test::call_and_read_body_json(&app, req).await;
        let page = page.data.unwrap();
        assert!(!page.categories[0].user_subscribed);

        let mut toggle = SubscriptionForm {
            category_id: sport.id.to_string(),
            action: "subscribe".to_string(),
            csrf_token: "forged".to_string(),
        };
        let req = test::TestRequest::post()
            .uri("/subscriptions/")
            .insert_header(bearer(&reader))
            .set_form(&toggle)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        toggle.csrf_token = page.csrf_token.clone();
        let req = test::TestRequest::post()
            .uri("/subscriptions/")
            .insert_header(bearer(&reader))
            .set_form(&toggle)
            .to_request();
        let after: ApiResponse<SubscriptionsPage> = test::call_and_read_body_json(&app, req).await;
        assert!(after.data.unwrap().categories[0].user_subscribed);

        toggle.action = "follow".to_string();
        let req = test::TestRequest::post()
            .uri("/subscriptions/")
            .insert_header(bearer(&reader))
            .set_form(&toggle)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
