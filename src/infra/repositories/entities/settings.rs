//! Shift settings database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{ShiftSettings, ShiftWindows};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// NULL for the global default row
    pub chat_id: Option<i32>,
    pub morning_start: Time,
    pub morning_end: Time,
    pub evening_start: Time,
    pub evening_end: Time,
    pub alerts_enabled: bool,
    pub include_weekends: bool,
    pub timezone: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ShiftSettings {
    fn from(model: Model) -> Self {
        ShiftSettings {
            id: model.id,
            chat_id: model.chat_id,
            windows: ShiftWindows {
                morning_start: model.morning_start,
                morning_end: model.morning_end,
                evening_start: model.evening_start,
                evening_end: model.evening_end,
            },
            alerts_enabled: model.alerts_enabled,
            include_weekends: model.include_weekends,
            timezone: model.timezone,
        }
    }
}
