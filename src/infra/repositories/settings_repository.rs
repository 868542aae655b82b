//! Shift settings repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::settings::{self, ActiveModel, Entity as SettingsEntity};
use crate::domain::{NewShiftSettings, ShiftSettings};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Settings repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Settings row of a chat (database id)
    async fn find_for_chat(&self, chat_id: i32) -> AppResult<Option<ShiftSettings>>;

    /// Global default row (`chat_id IS NULL`)
    async fn find_global(&self) -> AppResult<Option<ShiftSettings>>;

    /// Insert a settings row
    async fn create(&self, settings: NewShiftSettings) -> AppResult<ShiftSettings>;

    /// Overwrite the boolean flags of a row
    async fn update_flags(
        &self,
        id: i32,
        alerts_enabled: bool,
        include_weekends: bool,
    ) -> AppResult<ShiftSettings>;
}

/// Concrete implementation of SettingsRepository
pub struct SettingsStore {
    db: DatabaseConnection,
}

impl SettingsStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepository for SettingsStore {
    async fn find_for_chat(&self, chat_id: i32) -> AppResult<Option<ShiftSettings>> {
        let result = SettingsEntity::find()
            .filter(settings::Column::ChatId.eq(chat_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(ShiftSettings::from))
    }

    async fn find_global(&self) -> AppResult<Option<ShiftSettings>> {
        let result = SettingsEntity::find()
            .filter(settings::Column::ChatId.is_null())
            .order_by_asc(settings::Column::Id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(ShiftSettings::from))
    }

    async fn create(&self, new: NewShiftSettings) -> AppResult<ShiftSettings> {
        let active = ActiveModel {
            chat_id: Set(new.chat_id),
            morning_start: Set(new.windows.morning_start),
            morning_end: Set(new.windows.morning_end),
            evening_start: Set(new.windows.evening_start),
            evening_end: Set(new.windows.evening_end),
            alerts_enabled: Set(new.alerts_enabled),
            include_weekends: Set(new.include_weekends),
            timezone: Set(new.timezone),
            ..Default::default()
        };

        let model = active.insert(&self.db).await.map_err(AppError::from)?;
        Ok(ShiftSettings::from(model))
    }

    async fn update_flags(
        &self,
        id: i32,
        alerts_enabled: bool,
        include_weekends: bool,
    ) -> AppResult<ShiftSettings> {
        let row = SettingsEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = row.into();
        active.alerts_enabled = Set(alerts_enabled);
        active.include_weekends = Set(include_weekends);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(ShiftSettings::from(model))
    }
}
