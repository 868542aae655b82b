//! Daily statistics repository implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::daily_stat::{self, ActiveModel, Entity as DailyStatEntity};
use crate::domain::{DailyAggregate, DailyStat};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Daily statistics repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Insert the aggregate, or overwrite the row of the same (chat, date)
    async fn upsert(&self, aggregate: DailyAggregate) -> AppResult<DailyStat>;

    /// Row of a chat on a date
    async fn find(&self, chat_id: i32, date: NaiveDate) -> AppResult<Option<DailyStat>>;

    /// Rows within an inclusive date range ordered by date, for one chat
    /// or for all chats when `chat_id` is `None`
    async fn list_range(
        &self,
        chat_id: Option<i32>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<DailyStat>>;

    /// Rows of the given chats, newest first
    async fn list_for_chats(&self, chat_ids: Vec<i32>) -> AppResult<Vec<DailyStat>>;
}

/// Concrete implementation of StatsRepository
pub struct StatsStore {
    db: DatabaseConnection,
}

impl StatsStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, chat_id: i32, date: NaiveDate) -> AppResult<Option<daily_stat::Model>> {
        DailyStatEntity::find()
            .filter(daily_stat::Column::ChatId.eq(chat_id))
            .filter(daily_stat::Column::Date.eq(date))
            .one(&self.db)
            .await
            .map_err(AppError::from)
    }
}

fn into_domain(models: Vec<daily_stat::Model>) -> AppResult<Vec<DailyStat>> {
    models.into_iter().map(DailyStat::try_from).collect()
}

#[async_trait]
impl StatsRepository for StatsStore {
    async fn upsert(&self, aggregate: DailyAggregate) -> AppResult<DailyStat> {
        let misses = serde_json::to_value(&aggregate.misses)
            .map_err(|e| AppError::internal(format!("Misses serialization error: {}", e)))?;
        let now = chrono::Utc::now();

        let model = match self.find_model(aggregate.chat_id, aggregate.date).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.into();
                active.morning_cnt = Set(aggregate.morning_cnt);
                active.evening_cnt = Set(aggregate.evening_cnt);
                active.total_operators = Set(aggregate.total_operators);
                active.misses = Set(misses);
                active.created_at = Set(now);
                active.update(&self.db).await.map_err(AppError::from)?
            }
            None => {
                let active = ActiveModel {
                    chat_id: Set(aggregate.chat_id),
                    date: Set(aggregate.date),
                    morning_cnt: Set(aggregate.morning_cnt),
                    evening_cnt: Set(aggregate.evening_cnt),
                    total_operators: Set(aggregate.total_operators),
                    misses: Set(misses),
                    created_at: Set(now),
                    ..Default::default()
                };
                active.insert(&self.db).await.map_err(AppError::from)?
            }
        };

        DailyStat::try_from(model)
    }

    async fn find(&self, chat_id: i32, date: NaiveDate) -> AppResult<Option<DailyStat>> {
        self.find_model(chat_id, date)
            .await?
            .map(DailyStat::try_from)
            .transpose()
    }

    async fn list_range(
        &self,
        chat_id: Option<i32>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<DailyStat>> {
        let mut query = DailyStatEntity::find()
            .filter(daily_stat::Column::Date.between(from, to));
        if let Some(chat_id) = chat_id {
            query = query.filter(daily_stat::Column::ChatId.eq(chat_id));
        }

        let models = query
            .order_by_asc(daily_stat::Column::Date)
            .order_by_asc(daily_stat::Column::ChatId)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        into_domain(models)
    }

    async fn list_for_chats(&self, chat_ids: Vec<i32>) -> AppResult<Vec<DailyStat>> {
        if chat_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = DailyStatEntity::find()
            .filter(daily_stat::Column::ChatId.is_in(chat_ids))
            .order_by_desc(daily_stat::Column::Date)
            .order_by_asc(daily_stat::Column::ChatId)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        into_domain(models)
    }
}
