//! Category subscription entity for SeaORM.
//!
//! No unique index on (user_id, category_id): repeated subscriptions are
//! stored as separate rows.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscribers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for portal_core::domain::Subscriber {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
        }
    }
}

impl From<portal_core::domain::Subscriber> for ActiveModel {
    fn from(subscriber: portal_core::domain::Subscriber) -> Self {
        Self {
            id: Set(subscriber.id),
            user_id: Set(subscriber.user_id),
            category_id: Set(subscriber.category_id),
        }
    }
}
