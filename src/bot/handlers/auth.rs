//! Authorization flows in private chat.

use crate::bot::{keyboards, texts, BotContext};
use crate::domain::{AuthMethod, Conversation, ConversationKey, Step, UserProfile};
use crate::errors::AppResult;
use crate::telegram::types::{CallbackQuery, Contact, Message, User};
use crate::utils::decode_chat_payload;

fn profile(user: &User) -> UserProfile {
    UserProfile {
        telegram_id: user.id,
        username: user.username.clone(),
        full_name: Some(user.full_name()),
    }
}

/// `/start [payload]` - remember the target group and offer the methods.
pub async fn start(ctx: &BotContext, message: &Message, user: &User, payload: &str) -> AppResult<()> {
    let target_chat_id = if payload.is_empty() {
        None
    } else {
        decode_chat_payload(payload)
    };

    let key = ConversationKey::new(message.chat.id, user.id);
    ctx.save_conversation(
        key,
        Conversation {
            step: Step::AwaitingMethod,
            target_chat_id,
            ..Default::default()
        },
    )
    .await?;

    ctx.send_with(
        message.chat.id,
        texts::CHOOSE_AUTH_METHOD,
        keyboards::auth_methods(),
    )
    .await
}

pub async fn choose_phone(ctx: &BotContext, query: &CallbackQuery, key: ConversationKey) -> AppResult<()> {
    let mut conversation = ctx.conversation(key).await?;
    conversation.step = Step::AwaitingContact;
    ctx.save_conversation(key, conversation).await?;

    ctx.send_with(key.chat_id, texts::SEND_PHONE, keyboards::share_phone())
        .await?;
    ctx.answer(&query.id, None, false).await
}

pub async fn choose_captcha(ctx: &BotContext, query: &CallbackQuery, key: ConversationKey) -> AppResult<()> {
    let captcha = ctx.services.auth().new_captcha();

    let mut conversation = ctx.conversation(key).await?;
    conversation.step = Step::AwaitingCaptcha;
    conversation.captcha_answer = Some(captcha.answer());
    ctx.save_conversation(key, conversation).await?;

    ctx.send_with(
        key.chat_id,
        texts::captcha_question(captcha.a, captcha.b),
        keyboards::captcha(&captcha.options),
    )
    .await?;
    ctx.answer(&query.id, None, false).await
}

pub async fn captcha_answer(
    ctx: &BotContext,
    query: &CallbackQuery,
    key: ConversationKey,
    value: &str,
) -> AppResult<()> {
    let conversation = ctx.conversation(key).await?;
    let Some(target_chat_id) = conversation.target_chat_id else {
        return ctx.answer(&query.id, Some(texts::UNKNOWN_CHAT), true).await;
    };

    let chosen = value.parse::<i32>().ok();
    if chosen.is_none() || chosen != conversation.captcha_answer {
        return ctx.answer(&query.id, Some(texts::CAPTCHA_WRONG), true).await;
    }

    ctx.services
        .auth()
        .authorize(profile(&query.from), target_chat_id, AuthMethod::Captcha, None)
        .await?;
    ctx.clear_conversation(key).await?;

    ctx.send(key.chat_id, texts::CAPTCHA_AUTHORIZED).await?;
    ctx.answer(&query.id, None, false).await
}

pub async fn choose_invite(ctx: &BotContext, query: &CallbackQuery, key: ConversationKey) -> AppResult<()> {
    let mut conversation = ctx.conversation(key).await?;
    conversation.step = Step::AwaitingInvite;
    ctx.save_conversation(key, conversation).await?;

    ctx.send(key.chat_id, texts::ENTER_INVITE).await?;
    ctx.answer(&query.id, None, false).await
}

/// Shared contact while a phone number is expected.
pub async fn contact(
    ctx: &BotContext,
    message: &Message,
    user: &User,
    contact: &Contact,
    conversation: Conversation,
) -> AppResult<()> {
    let key = ConversationKey::new(message.chat.id, user.id);
    let Some(target_chat_id) = conversation.target_chat_id else {
        ctx.clear_conversation(key).await?;
        return ctx.send(message.chat.id, texts::NO_TARGET_USE_LINK).await;
    };
    if contact.user_id.is_some_and(|owner| owner != user.id) {
        return ctx.send(message.chat.id, texts::FOREIGN_CONTACT).await;
    }

    let auth = ctx.services.auth();
    let phone = auth.verify_phone(&contact.phone_number);
    auth.authorize(profile(user), target_chat_id, AuthMethod::Phone, Some(phone))
        .await?;
    ctx.clear_conversation(key).await?;

    ctx.send_with(
        message.chat.id,
        texts::PHONE_AUTHORIZED,
        keyboards::remove_keyboard(),
    )
    .await
}

/// Text while an invite code is expected.
pub async fn invite_code(
    ctx: &BotContext,
    message: &Message,
    user: &User,
    code: &str,
    conversation: Conversation,
) -> AppResult<()> {
    let key = ConversationKey::new(message.chat.id, user.id);
    let Some(target_chat_id) = conversation.target_chat_id else {
        ctx.clear_conversation(key).await?;
        return ctx.send(message.chat.id, texts::NO_TARGET).await;
    };

    let auth = ctx.services.auth();
    if !auth.check_invite(code) {
        return ctx.send(message.chat.id, texts::INVITE_WRONG).await;
    }

    auth.authorize(profile(user), target_chat_id, AuthMethod::Invite, None)
        .await?;
    ctx.clear_conversation(key).await?;

    ctx.send(message.chat.id, texts::INVITE_AUTHORIZED).await
}
