//! Membership database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{AuthMethod, Membership, Role};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "memberships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub chat_id: i32,
    pub role: String,
    pub authorized: bool,
    pub authorized_via: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Membership {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Membership {
            id: model.id,
            user_id: model.user_id,
            chat_id: model.chat_id,
            role: model.role.parse::<Role>()?,
            authorized: model.authorized,
            authorized_via: model
                .authorized_via
                .as_deref()
                .map(str::parse::<AuthMethod>)
                .transpose()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
