//! PostgreSQL repository implementations.

use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, Query, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use portal_core::domain::{
    Author, AuthorProfile, Category, Comment, Post, PostCategory, Subscriber, User, Vote,
    mask_email,
};
use portal_core::error::RepoError;
use portal_core::ports::{
    AuthorRepository, CategoryRepository, CommentRepository, Page, PostOrdering, PostQuery,
    PostRepository, SubscriberRepository, UserRepository,
};
use portal_core::services::PostFilter;

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category::{self, Entity as PostCategoryEntity};
use super::entity::subscriber::{self, Entity as SubscriberEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

pub type PostgresSubscriberRepository = PostgresBaseRepository<SubscriberEntity>;

fn map_txn_err(e: TransactionError<DbErr>) -> RepoError {
    match e {
        TransactionError::Connection(err) | TransactionError::Transaction(err) => map_db_err(err),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let result = AuthorEntity::find()
            .filter(author::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_profiles(&self) -> Result<Vec<AuthorProfile>, RepoError> {
        let rows = AuthorEntity::find()
            .find_also_related(UserEntity)
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(author, user)| {
                user.map(|user| AuthorProfile {
                    author: author.into(),
                    username: user.username,
                })
            })
            .collect())
    }

    async fn set_rating(&self, id: Uuid, rating: i64) -> Result<(), RepoError> {
        let result = AuthorEntity::update_many()
            .col_expr(author::Column::Rating, Expr::value(rating))
            .filter(author::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

/// Escape `LIKE` wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn posts_in_category(category_id: Uuid) -> SelectStatement {
    Query::select()
        .column(post_category::Column::PostId)
        .from(PostCategoryEntity)
        .and_where(post_category::Column::CategoryId.eq(category_id))
        .to_owned()
}

fn categories_of_post(post_id: Uuid) -> SelectStatement {
    Query::select()
        .column(post_category::Column::CategoryId)
        .from(PostCategoryEntity)
        .and_where(post_category::Column::PostId.eq(post_id))
        .to_owned()
}

/// Translate the domain filter into a SQL condition.
pub(crate) fn filter_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(needle) = filter.title_needle() {
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col((PostEntity, post::Column::Title))))
                .like(format!("%{}%", escape_like(&needle))),
        );
    }

    if let Some(category_id) = filter.category {
        condition = condition.add(post::Column::Id.in_subquery(posts_in_category(category_id)));
    }

    if let Some(after) = filter.created_after {
        condition = condition.add(post::Column::CreatedAt.gt(after.fixed_offset()));
    }

    condition
}

fn ordered(select: Select<PostEntity>, ordering: PostOrdering) -> Select<PostEntity> {
    match ordering {
        PostOrdering::NewestFirst => select.order_by_desc(post::Column::CreatedAt),
        PostOrdering::OldestFirst => select.order_by_asc(post::Column::CreatedAt),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_with_categories(
        &self,
        post: Post,
        category_ids: &[Uuid],
    ) -> Result<Post, RepoError> {
        let category_ids = category_ids.to_vec();

        let model = self
            .db
            .transaction::<_, post::Model, DbErr>(|txn| {
                Box::pin(async move {
                    let model = post::ActiveModel::from(post).insert(txn).await?;
                    for category_id in category_ids {
                        post_category::ActiveModel::from(PostCategory::new(model.id, category_id))
                            .insert(txn)
                            .await?;
                    }
                    Ok(model)
                })
            })
            .await
            .map_err(map_txn_err)?;

        Ok(model.into())
    }

    async fn update_with_categories(
        &self,
        post: Post,
        category_ids: &[Uuid],
    ) -> Result<(Post, Vec<Uuid>), RepoError> {
        let wanted = category_ids.to_vec();

        let (model, added) = self
            .db
            .transaction::<_, (post::Model, Vec<Uuid>), DbErr>(|txn| {
                Box::pin(async move {
                    let model = post::ActiveModel::from(post).update(txn).await?;

                    let existing: HashSet<Uuid> = PostCategoryEntity::find()
                        .filter(post_category::Column::PostId.eq(model.id))
                        .all(txn)
                        .await?
                        .into_iter()
                        .map(|link| link.category_id)
                        .collect();

                    let removed: Vec<Uuid> = existing
                        .iter()
                        .filter(|id| !wanted.contains(id))
                        .copied()
                        .collect();
                    if !removed.is_empty() {
                        PostCategoryEntity::delete_many()
                            .filter(post_category::Column::PostId.eq(model.id))
                            .filter(post_category::Column::CategoryId.is_in(removed))
                            .exec(txn)
                            .await?;
                    }

                    let added: Vec<Uuid> = wanted
                        .into_iter()
                        .filter(|id| !existing.contains(id))
                        .collect();
                    for category_id in &added {
                        post_category::ActiveModel::from(PostCategory::new(model.id, *category_id))
                            .insert(txn)
                            .await?;
                    }

                    Ok((model, added))
                })
            })
            .await
            .map_err(map_txn_err)?;

        Ok((model.into(), added))
    }

    async fn query(&self, query: &PostQuery) -> Result<Page<Post>, RepoError> {
        let mut select = PostEntity::find().filter(filter_condition(&query.filter));
        if let Some(kind) = query.kind {
            select = select.filter(post::Column::Kind.eq(post::Kind::from(kind)));
        }
        let select = ordered(select, query.ordering);

        match query.page {
            Some(window) => {
                let paginator = select.paginate(&self.db, window.per_page);
                let total = paginator.num_items().await.map_err(map_db_err)?;
                let items = paginator
                    .fetch_page(window.page - 1)
                    .await
                    .map_err(map_db_err)?;

                Ok(Page {
                    items: items.into_iter().map(Into::into).collect(),
                    total,
                    page: window.page,
                    per_page: window.per_page,
                })
            }
            None => {
                let items: Vec<Post> = select
                    .all(&self.db)
                    .await
                    .map_err(map_db_err)?
                    .into_iter()
                    .map(Into::into)
                    .collect();
                let total = items.len() as u64;

                Ok(Page {
                    items,
                    total,
                    page: 1,
                    per_page: total.max(1),
                })
            }
        }
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn categories_of(&self, post_id: Uuid) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Id.in_subquery(categories_of_post(post_id)))
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn adjust_rating(&self, id: Uuid, vote: Vote) -> Result<i64, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::Rating,
                Expr::col(post::Column::Rating).add(vote.delta()),
            )
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;
        Ok(model.rating)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn adjust_rating(&self, id: Uuid, vote: Vote) -> Result<i64, RepoError> {
        let result = CommentEntity::update_many()
            .col_expr(
                comment::Column::Rating,
                Expr::col(comment::Column::Rating).add(vote.delta()),
            )
            .filter(comment::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        let model = CommentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;
        Ok(model.rating)
    }
}

#[async_trait]
impl SubscriberRepository for PostgresSubscriberRepository {
    async fn subscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<Subscriber, RepoError> {
        let model = subscriber::ActiveModel::from(Subscriber::new(user_id, category_id))
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn unsubscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<u64, RepoError> {
        let result = SubscriberEntity::delete_many()
            .filter(subscriber::Column::UserId.eq(user_id))
            .filter(subscriber::Column::CategoryId.eq(category_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }

    async fn find_by_category(&self, category_id: Uuid) -> Result<Vec<Subscriber>, RepoError> {
        let result = SubscriberEntity::find()
            .filter(subscriber::Column::CategoryId.eq(category_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Subscriber>, RepoError> {
        let result = SubscriberEntity::find()
            .filter(subscriber::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_for(&self, user_id: Uuid, category_id: Uuid) -> Result<u64, RepoError> {
        SubscriberEntity::find()
            .filter(subscriber::Column::UserId.eq(user_id))
            .filter(subscriber::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}
