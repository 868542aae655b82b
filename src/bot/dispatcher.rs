//! Update routing.

use std::sync::Arc;

use super::command::Command;
use super::handlers::{admin, auth, checkins, group, reports, settings};
use super::keyboards::{
    AUTH_CAPTCHA, AUTH_INVITE, AUTH_PHONE, CAPTCHA_ANSWER_PREFIX, CHECKIN_CONFIRM_PREFIX,
    REPORT_PERIOD_PREFIX, SETTINGS_TOGGLE_PREFIX,
};
use super::{texts, BotContext};
use crate::domain::{ConversationKey, Step};
use crate::errors::{AppError, AppResult};
use crate::telegram::types::{CallbackQuery, Message, Update, User};

/// Routes updates to handlers. Cheap to clone into per-update tasks.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<BotContext>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    /// Handle one update. Failures are logged and reported back to the user,
    /// never propagated to the polling loop.
    pub async fn handle(&self, update: Update) {
        let update_id = update.update_id;

        if let Some(event) = update.my_chat_member {
            if let Err(e) = group::on_my_chat_member(&self.ctx, event).await {
                log_failure(update_id, &e);
            }
            return;
        }

        if let Some(query) = update.callback_query {
            if let Err(e) = self.on_callback(&query).await {
                log_failure(update_id, &e);
                let message = e.user_message();
                if let Err(e) = self.ctx.answer(&query.id, Some(&message), true).await {
                    tracing::warn!(update_id, error = %e, "Failed to answer callback");
                }
            }
            return;
        }

        if let Some(message) = update.message {
            let Some(user) = message.from.clone() else {
                return;
            };
            if let Err(e) = self.on_message(&message, &user).await {
                log_failure(update_id, &e);
                if let Err(e) = self.ctx.send(message.chat.id, e.user_message()).await {
                    tracing::warn!(update_id, error = %e, "Failed to report error to user");
                }
            }
        }
    }

    async fn on_callback(&self, query: &CallbackQuery) -> AppResult<()> {
        let ctx = &*self.ctx;
        let data = query.data.as_deref().unwrap_or_default();
        let chat_id = query
            .message
            .as_ref()
            .map(|message| message.chat.id)
            .unwrap_or(query.from.id);
        let key = ConversationKey::new(chat_id, query.from.id);

        tracing::debug!(user_id = query.from.id, data, "Callback query");

        match data {
            AUTH_PHONE => auth::choose_phone(ctx, query, key).await,
            AUTH_CAPTCHA => auth::choose_captcha(ctx, query, key).await,
            AUTH_INVITE => auth::choose_invite(ctx, query, key).await,
            _ => {
                if let Some(value) = data.strip_prefix(CAPTCHA_ANSWER_PREFIX) {
                    auth::captcha_answer(ctx, query, key, value).await
                } else if let Some(kind) = data.strip_prefix(CHECKIN_CONFIRM_PREFIX) {
                    checkins::confirm(ctx, query, key, kind).await
                } else if let Some(period) = data.strip_prefix(REPORT_PERIOD_PREFIX) {
                    reports::period(ctx, query, chat_id, period).await
                } else if let Some(toggle) = data.strip_prefix(SETTINGS_TOGGLE_PREFIX) {
                    settings::toggle(ctx, query, toggle).await
                } else {
                    ctx.answer(&query.id, None, false).await
                }
            }
        }
    }

    async fn on_message(&self, message: &Message, user: &User) -> AppResult<()> {
        let ctx = &*self.ctx;

        if let Some(text) = message.text.as_deref() {
            if let Some(command) = Command::parse(text, &ctx.bot_username) {
                return self.on_command(message, user, &command).await;
            }
        }

        if !message.chat.is_private() {
            return Ok(());
        }

        let key = ConversationKey::new(message.chat.id, user.id);
        let conversation = ctx.conversation(key).await?;

        if let Some(contact) = &message.contact {
            if conversation.step == Step::AwaitingContact {
                return auth::contact(ctx, message, user, contact, conversation).await;
            }
            return Ok(());
        }
        if let Some(sizes) = &message.photo {
            return checkins::photo(ctx, message, user, sizes).await;
        }
        if let Some(text) = message.text.as_deref() {
            if conversation.step == Step::AwaitingInvite {
                return auth::invite_code(ctx, message, user, text.trim(), conversation).await;
            }
        }
        Ok(())
    }

    async fn on_command(&self, message: &Message, user: &User, command: &Command<'_>) -> AppResult<()> {
        let ctx = &*self.ctx;
        tracing::debug!(
            chat_id = message.chat.id,
            user_id = user.id,
            command = %command.name,
            "Command"
        );

        match command.name.as_str() {
            "link" => group::link(ctx, message).await,
            "start" if message.chat.is_private() => {
                auth::start(ctx, message, user, command.args).await
            }
            "report" => reports::menu(ctx, message, texts::CHOOSE_PERIOD).await,
            "dashboard" => reports::menu(ctx, message, texts::DASHBOARD).await,
            "chats" => reports::chats(ctx, message, user).await,
            "export" => reports::export(ctx, message, user).await,
            "settings" => settings::show(ctx, message, user).await,
            "help" => admin::help(ctx, message).await,
            "health" => admin::health(ctx, message).await,
            "lang" => admin::lang(ctx, message, user).await,
            "my" => admin::my_roles(ctx, message, user).await,
            "setrole" => admin::set_role(ctx, message, user, command).await,
            _ => Ok(()),
        }
    }
}

fn log_failure(update_id: i64, error: &AppError) {
    if error.is_client_error() {
        tracing::warn!(update_id, code = error.code(), error = %error, "Update rejected");
    } else {
        tracing::error!(update_id, code = error.code(), error = %error, "Update handling failed");
    }
}
