//! Administrative commands.

use crate::bot::command::Command;
use crate::bot::{texts, BotContext};
use crate::domain::Role;
use crate::errors::AppResult;
use crate::services::{RoleChange, RoleTarget};
use crate::telegram::types::{Message, User};

pub async fn help(ctx: &BotContext, message: &Message) -> AppResult<()> {
    ctx.send(message.chat.id, texts::HELP).await
}

pub async fn health(ctx: &BotContext, message: &Message) -> AppResult<()> {
    ctx.send(message.chat.id, texts::HEALTH_OK).await
}

/// `/lang` - toggle the stored locale between ru and en.
pub async fn lang(ctx: &BotContext, message: &Message, user: &User) -> AppResult<()> {
    match ctx.services.memberships().toggle_locale(user.id).await? {
        Some(locale) => ctx.send(message.chat.id, texts::language_changed(&locale)).await,
        None => ctx.send(message.chat.id, texts::AUTHORIZE_BEFORE_LANG).await,
    }
}

/// `/my` - roles per chat.
pub async fn my_roles(ctx: &BotContext, message: &Message, user: &User) -> AppResult<()> {
    let roles = ctx.services.memberships().roles(user.id).await?;
    if roles.is_empty() {
        return ctx.send(message.chat.id, texts::NO_ROLES).await;
    }
    ctx.send(message.chat.id, texts::roles(&roles)).await
}

/// `/setrole <user_id|@username> <operator|manager>` in a group, for the
/// owner or a chat administrator.
pub async fn set_role(
    ctx: &BotContext,
    message: &Message,
    user: &User,
    command: &Command<'_>,
) -> AppResult<()> {
    let chat_id = message.chat.id;
    if !message.chat.is_group() {
        return ctx.send(chat_id, texts::GROUP_ONLY).await;
    }
    if !ctx.config.is_owner(user.id) {
        let member = ctx.api.get_chat_member(chat_id, user.id).await?;
        if !member.is_admin() {
            return ctx.send(chat_id, texts::NOT_ENOUGH_RIGHTS).await;
        }
    }

    let args = command.arg_list();
    let [target, role, ..] = args.as_slice() else {
        return ctx.send(chat_id, texts::SETROLE_USAGE).await;
    };
    let Ok(role) = role.parse::<Role>() else {
        return ctx.send(chat_id, texts::UNKNOWN_ROLE).await;
    };
    let Ok(target) = target.parse::<RoleTarget>() else {
        return ctx.send(chat_id, texts::BAD_IDENTIFIER).await;
    };

    let change = ctx
        .services
        .memberships()
        .set_role(chat_id, message.chat.title.clone(), target, role)
        .await?;

    let reply = match change {
        RoleChange::UnknownUsername => texts::USER_NOT_FOUND,
        RoleChange::UnknownUser => texts::USER_NOT_AUTHORIZED,
        RoleChange::Updated(_) => texts::ROLE_UPDATED,
    };
    ctx.send(chat_id, reply).await
}
