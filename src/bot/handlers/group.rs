//! Group chat interactions.

use crate::bot::{keyboards, texts, BotContext};
use crate::errors::AppResult;
use crate::telegram::types::{ChatMemberUpdated, Message};
use crate::utils::deep_link;

/// Greet a group when the bot is added to it and register the chat.
pub async fn on_my_chat_member(ctx: &BotContext, event: ChatMemberUpdated) -> AppResult<()> {
    let member = &event.new_chat_member;
    if member.user.id != ctx.bot_id || !event.chat.is_group() {
        return Ok(());
    }
    if !member.is_active() || event.old_chat_member.is_active() {
        return Ok(());
    }

    let chat_id = event.chat.id;
    ctx.send_with(
        chat_id,
        texts::GROUP_GREETING,
        keyboards::authorize_link(&ctx.bot_username, chat_id),
    )
    .await?;
    ctx.services
        .memberships()
        .register_chat(chat_id, event.chat.title.clone())
        .await?;

    tracing::info!(chat_id, title = ?event.chat.title, "Bot added to group");
    Ok(())
}

/// `/link` - deep link to the private authorization chat.
pub async fn link(ctx: &BotContext, message: &Message) -> AppResult<()> {
    if !message.chat.is_group() {
        return Ok(());
    }
    let url = deep_link(&ctx.bot_username, message.chat.id);
    ctx.send(message.chat.id, texts::link(&url)).await
}
