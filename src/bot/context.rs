//! Shared state handed to every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::domain::{Conversation, ConversationKey};
use crate::errors::AppResult;
use crate::infra::StateStore;
use crate::services::ServiceContainer;
use crate::telegram::types::{InputFile, ReplyMarkup, User};
use crate::telegram::BotApi;

/// Handler dependencies
pub struct BotContext {
    pub api: Arc<dyn BotApi>,
    pub services: Arc<dyn ServiceContainer>,
    pub state: Arc<dyn StateStore>,
    pub config: Config,
    /// Telegram id of the bot account
    pub bot_id: i64,
    /// Username of the bot, without `@`
    pub bot_username: String,
}

impl BotContext {
    pub fn new(
        api: Arc<dyn BotApi>,
        services: Arc<dyn ServiceContainer>,
        state: Arc<dyn StateStore>,
        config: Config,
        me: &User,
    ) -> Self {
        Self {
            api,
            services,
            state,
            config,
            bot_id: me.id,
            bot_username: me.username.clone().unwrap_or_default(),
        }
    }

    pub async fn send(&self, chat_id: i64, text: impl Into<String>) -> AppResult<()> {
        self.api.send_message(chat_id, text.into(), None).await?;
        Ok(())
    }

    pub async fn send_with(
        &self,
        chat_id: i64,
        text: impl Into<String>,
        markup: impl Into<ReplyMarkup>,
    ) -> AppResult<()> {
        self.api
            .send_message(chat_id, text.into(), Some(markup.into()))
            .await?;
        Ok(())
    }

    pub async fn send_photo(&self, chat_id: i64, file: InputFile, caption: String) -> AppResult<()> {
        self.api.send_photo(chat_id, file, Some(caption)).await?;
        Ok(())
    }

    pub async fn send_document(
        &self,
        chat_id: i64,
        file: InputFile,
        caption: impl Into<String>,
    ) -> AppResult<()> {
        self.api
            .send_document(chat_id, file, Some(caption.into()))
            .await?;
        Ok(())
    }

    /// Acknowledge a callback query, optionally with a notification or alert.
    pub async fn answer(&self, query_id: &str, text: Option<&str>, alert: bool) -> AppResult<()> {
        self.api
            .answer_callback_query(query_id.to_string(), text.map(str::to_string), alert)
            .await?;
        Ok(())
    }

    pub async fn conversation(&self, key: ConversationKey) -> AppResult<Conversation> {
        self.state.load(key).await
    }

    pub async fn save_conversation(
        &self,
        key: ConversationKey,
        conversation: Conversation,
    ) -> AppResult<()> {
        self.state.save(key, conversation).await
    }

    pub async fn clear_conversation(&self, key: ConversationKey) -> AppResult<()> {
        self.state.clear(key).await
    }
}
