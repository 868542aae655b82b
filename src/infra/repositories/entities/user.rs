//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub phone_last4: Option<String>,
    pub phone_sha256: Option<String>,
    pub phone_verified_at: Option<DateTimeUtc>,
    pub dm_blocked: bool,
    pub locale: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            telegram_id: model.telegram_id,
            username: model.username,
            full_name: model.full_name,
            phone_last4: model.phone_last4,
            phone_sha256: model.phone_sha256,
            phone_verified_at: model.phone_verified_at,
            dm_blocked: model.dm_blocked,
            locale: model.locale,
            created_at: model.created_at,
        }
    }
}
