//! Chat repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::chat::{self, ActiveModel, Entity as ChatEntity};
use crate::domain::Chat;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Chat repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Find chat by database id
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Chat>>;

    /// Find chat by Telegram chat id
    async fn find_by_chat_id(&self, chat_id: i64) -> AppResult<Option<Chat>>;

    /// List all chats
    async fn list(&self) -> AppResult<Vec<Chat>>;

    /// Return the chat, creating it with the given title and timezone
    /// when missing. An existing chat is left untouched.
    async fn get_or_create(
        &self,
        chat_id: i64,
        title: Option<String>,
        timezone: String,
    ) -> AppResult<Chat>;

    /// Create the chat or refresh its title.
    async fn upsert_title(
        &self,
        chat_id: i64,
        title: Option<String>,
        timezone: String,
    ) -> AppResult<Chat>;
}

/// Concrete implementation of ChatRepository
pub struct ChatStore {
    db: DatabaseConnection,
}

impl ChatStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, chat_id: i64) -> AppResult<Option<chat::Model>> {
        ChatEntity::find()
            .filter(chat::Column::ChatId.eq(chat_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn insert(
        &self,
        chat_id: i64,
        title: Option<String>,
        timezone: String,
    ) -> AppResult<chat::Model> {
        let active = ActiveModel {
            chat_id: Set(chat_id),
            title: Set(title),
            timezone: Set(timezone),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        active.insert(&self.db).await.map_err(AppError::from)
    }
}

#[async_trait]
impl ChatRepository for ChatStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Chat>> {
        let result = ChatEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Chat::from))
    }

    async fn find_by_chat_id(&self, chat_id: i64) -> AppResult<Option<Chat>> {
        Ok(self.find_model(chat_id).await?.map(Chat::from))
    }

    async fn list(&self) -> AppResult<Vec<Chat>> {
        let models = ChatEntity::find()
            .order_by_asc(chat::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Chat::from).collect())
    }

    async fn get_or_create(
        &self,
        chat_id: i64,
        title: Option<String>,
        timezone: String,
    ) -> AppResult<Chat> {
        match self.find_model(chat_id).await? {
            Some(model) => Ok(Chat::from(model)),
            None => Ok(Chat::from(self.insert(chat_id, title, timezone).await?)),
        }
    }

    async fn upsert_title(
        &self,
        chat_id: i64,
        title: Option<String>,
        timezone: String,
    ) -> AppResult<Chat> {
        let model = match self.find_model(chat_id).await? {
            Some(model) => {
                let mut active: ActiveModel = model.into();
                active.title = Set(title);
                active.update(&self.db).await.map_err(AppError::from)?
            }
            None => self.insert(chat_id, title, timezone).await?,
        };

        Ok(Chat::from(model))
    }
}
