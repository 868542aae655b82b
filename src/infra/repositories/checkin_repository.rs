//! Check-in repository implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::entities::checkin::{self, ActiveModel, Entity as CheckinEntity};
use crate::domain::{Checkin, CheckinKind, NewCheckin};
use crate::errors::{is_unique_violation, AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Check-in repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CheckinRepository: Send + Sync {
    /// Whether the check-in for (user, chat, kind, date) is already stored
    async fn exists(
        &self,
        user_id: i32,
        chat_id: i32,
        kind: CheckinKind,
        date: NaiveDate,
    ) -> AppResult<bool>;

    /// Insert a check-in. A duplicate yields `AppError::Conflict`.
    async fn create(&self, checkin: NewCheckin) -> AppResult<Checkin>;

    /// Check-ins of a chat on a local date
    async fn list_for_day(&self, chat_id: i32, date: NaiveDate) -> AppResult<Vec<Checkin>>;

    /// Every check-in of a chat, oldest first
    async fn list_for_chat(&self, chat_id: i32) -> AppResult<Vec<Checkin>>;
}

/// Concrete implementation of CheckinRepository
pub struct CheckinStore {
    db: DatabaseConnection,
}

impl CheckinStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_domain(models: Vec<checkin::Model>) -> AppResult<Vec<Checkin>> {
    models.into_iter().map(Checkin::try_from).collect()
}

#[async_trait]
impl CheckinRepository for CheckinStore {
    async fn exists(
        &self,
        user_id: i32,
        chat_id: i32,
        kind: CheckinKind,
        date: NaiveDate,
    ) -> AppResult<bool> {
        let count = CheckinEntity::find()
            .filter(checkin::Column::UserId.eq(user_id))
            .filter(checkin::Column::ChatId.eq(chat_id))
            .filter(checkin::Column::Kind.eq(kind.as_str()))
            .filter(checkin::Column::CheckinDate.eq(date))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn create(&self, checkin: NewCheckin) -> AppResult<Checkin> {
        let active = ActiveModel {
            user_id: Set(checkin.user_id),
            chat_id: Set(checkin.chat_id),
            kind: Set(checkin.kind.as_str().to_string()),
            photo_file_id: Set(checkin.photo_file_id),
            file_unique_id: Set(checkin.file_unique_id),
            created_at: Set(chrono::Utc::now()),
            checkin_date: Set(checkin.checkin_date),
            ..Default::default()
        };

        let model = active.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("Check-in")
            } else {
                AppError::from(e)
            }
        })?;

        Checkin::try_from(model)
    }

    async fn list_for_day(&self, chat_id: i32, date: NaiveDate) -> AppResult<Vec<Checkin>> {
        let models = CheckinEntity::find()
            .filter(checkin::Column::ChatId.eq(chat_id))
            .filter(checkin::Column::CheckinDate.eq(date))
            .order_by_asc(checkin::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        into_domain(models)
    }

    async fn list_for_chat(&self, chat_id: i32) -> AppResult<Vec<Checkin>> {
        let models = CheckinEntity::find()
            .filter(checkin::Column::ChatId.eq(chat_id))
            .order_by_asc(checkin::Column::CheckinDate)
            .order_by_asc(checkin::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        into_domain(models)
    }
}
