//! Check-in database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Checkin, CheckinKind};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "checkins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub chat_id: i32,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub photo_file_id: String,
    pub file_unique_id: String,
    pub created_at: DateTimeUtc,
    pub checkin_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Checkin {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Checkin {
            id: model.id,
            user_id: model.user_id,
            chat_id: model.chat_id,
            kind: model.kind.parse::<CheckinKind>()?,
            photo_file_id: model.photo_file_id,
            file_unique_id: model.file_unique_id,
            created_at: model.created_at,
            checkin_date: model.checkin_date,
        })
    }
}
