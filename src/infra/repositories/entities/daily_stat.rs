//! Daily statistics database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{DailyStat, Misses};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub chat_id: i32,
    pub date: Date,
    pub morning_cnt: i32,
    pub evening_cnt: i32,
    pub total_operators: i32,
    /// `{"morning": [user ids], "evening": [user ids]}`
    pub misses: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for DailyStat {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let misses: Misses = serde_json::from_value(model.misses)
            .map_err(|e| AppError::internal(format!("Malformed misses payload: {}", e)))?;
        Ok(DailyStat {
            id: model.id,
            chat_id: model.chat_id,
            date: model.date,
            morning_cnt: model.morning_cnt,
            evening_cnt: model.evening_cnt,
            total_operators: model.total_operators,
            misses,
            created_at: model.created_at,
        })
    }
}
