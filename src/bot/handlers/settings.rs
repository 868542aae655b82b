//! Chat settings management.

use crate::bot::{keyboards, texts, BotContext};
use crate::domain::SettingsToggle;
use crate::errors::AppResult;
use crate::services::SettingsAccess;
use crate::telegram::types::{CallbackQuery, Message, User};

/// `/settings`
pub async fn show(ctx: &BotContext, message: &Message, user: &User) -> AppResult<()> {
    match ctx.services.settings().open(user.id).await? {
        SettingsAccess::NoMembership => ctx.send(message.chat.id, texts::NO_ACCESS).await,
        SettingsAccess::NotManager => ctx.send(message.chat.id, texts::MANAGER_ONLY).await,
        SettingsAccess::Granted { chat, settings } => {
            ctx.send_with(
                message.chat.id,
                texts::settings(&chat, &settings),
                keyboards::settings(&settings),
            )
            .await
        }
    }
}

/// `settings:toggle:<alerts|weekend>` - flip and redraw the keyboard in place.
pub async fn toggle(ctx: &BotContext, query: &CallbackQuery, key: &str) -> AppResult<()> {
    let Some(toggle) = SettingsToggle::from_key(key) else {
        return ctx.answer(&query.id, None, false).await;
    };

    let settings = match ctx.services.settings().toggle(query.from.id, toggle).await? {
        SettingsAccess::NoMembership => {
            return ctx.answer(&query.id, Some(texts::NO_ACCESS), true).await
        }
        SettingsAccess::NotManager => {
            return ctx
                .answer(&query.id, Some(texts::NOT_ENOUGH_RIGHTS), true)
                .await
        }
        SettingsAccess::Granted { settings, .. } => settings,
    };

    if let Some(message) = &query.message {
        ctx.api
            .edit_message_reply_markup(
                message.chat.id,
                message.message_id,
                keyboards::settings(&settings),
            )
            .await?;
    }
    ctx.answer(&query.id, Some(texts::UPDATED), false).await
}
