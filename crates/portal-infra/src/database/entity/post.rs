//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use portal_core::domain::PostKind;

/// Stored form of [`PostKind`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")]
pub enum Kind {
    #[sea_orm(string_value = "NW")]
    News,
    #[sea_orm(string_value = "AR")]
    Article,
}

impl From<PostKind> for Kind {
    fn from(kind: PostKind) -> Self {
        match kind {
            PostKind::News => Kind::News,
            PostKind::Article => Kind::Article,
        }
    }
}

impl From<Kind> for PostKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::News => PostKind::News,
            Kind::Article => PostKind::Article,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub kind: Kind,
    pub created_at: DateTimeWithTimeZone,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub rating: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::post_category::Entity")]
    PostCategory,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::post_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostCategory.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for portal_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            kind: model.kind.into(),
            created_at: model.created_at.into(),
            title: model.title,
            text: model.text,
            rating: model.rating,
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<portal_core::domain::Post> for ActiveModel {
    fn from(post: portal_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            kind: Set(post.kind.into()),
            created_at: Set(post.created_at.into()),
            title: Set(post.title),
            text: Set(post.text),
            rating: Set(post.rating),
        }
    }
}
