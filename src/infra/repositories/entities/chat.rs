//! Chat database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Chat;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "chats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub chat_id: i64,
    pub title: Option<String>,
    pub timezone: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Chat {
    fn from(model: Model) -> Self {
        Chat {
            id: model.id,
            chat_id: model.chat_id,
            title: model.title,
            timezone: model.timezone,
            created_at: model.created_at,
        }
    }
}
