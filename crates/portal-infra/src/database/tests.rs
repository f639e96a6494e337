use std::collections::BTreeMap;

use chrono::Utc;
use portal_core::domain::{Post, PostKind, User, Vote};
use portal_core::error::RepoError;
use portal_core::ports::{
    BaseRepository, PageRequest, PostQuery, PostRepository, SubscriberRepository, UserRepository,
};
use portal_core::services::PostFilter;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use crate::database::entity::{post, post_category, user};
use crate::database::postgres_repo::{
    PostgresPostRepository, PostgresSubscriberRepository, PostgresUserRepository,
};

fn post_model(id: Uuid, title: &str, rating: i64) -> post::Model {
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        kind: post::Kind::News,
        created_at: Utc::now().into(),
        title: title.to_owned(),
        text: "Body".to_owned(),
        rating,
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    let mut row = BTreeMap::new();
    row.insert("num_items", Value::from(n));
    row
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, "Test Post", 0)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.kind, PostKind::News);
}

#[tokio::test]
async fn test_find_user_by_email() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: Uuid::new_v4(),
            username: "reader".to_owned(),
            email: "reader@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user: User = repo
        .find_by_email("reader@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.username, "reader");
}

#[tokio::test]
async fn test_delete_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_adjust_rating_returns_stored_value() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results(vec![vec![post_model(post_id, "Rated", 5)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert_eq!(
        PostRepository::adjust_rating(&repo, post_id, Vote::Like).await.unwrap(),
        5
    );
}

#[tokio::test]
async fn test_adjust_rating_of_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = PostRepository::adjust_rating(&repo, Uuid::new_v4(), Vote::Dislike).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_query_reports_page_and_total() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row(12)]])
        .append_query_results(vec![vec![
            post_model(Uuid::new_v4(), "Eleventh", 0),
            post_model(Uuid::new_v4(), "Twelfth", 0),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let page = repo
        .query(&PostQuery::new(PostFilter::default()).paginate(PageRequest::new(2, 10)))
        .await
        .unwrap();

    assert_eq!(page.total, 12);
    assert_eq!(page.page, 2);
    assert_eq!(page.num_pages(), 2);
    assert_eq!(page.items.len(), 2);
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_create_with_categories_links_each_category() {
    let post_id = Uuid::new_v4();
    let economy = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, "Linked", 0)]])
        .append_query_results(vec![vec![post_category::Model {
            id: Uuid::new_v4(),
            post_id,
            category_id: economy,
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let mut post = Post::new(
        Uuid::new_v4(),
        PostKind::News,
        "Linked".into(),
        "Body".into(),
    );
    post.id = post_id;

    let stored = repo.create_with_categories(post, &[economy]).await.unwrap();
    assert_eq!(stored.id, post_id);
}

#[tokio::test]
async fn test_count_subscriptions_for_pair() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row(2)]])
        .into_connection();

    let repo = PostgresSubscriberRepository::new(db);

    let count = repo
        .count_for(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(count, 2);
}
