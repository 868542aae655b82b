//! Photo check-ins in private chat.

use chrono::Utc;

use crate::bot::{keyboards, texts, BotContext};
use crate::domain::{CheckinKind, ConversationKey, PendingPhoto, Step};
use crate::errors::AppResult;
use crate::services::CheckinOutcome;
use crate::telegram::types::{CallbackQuery, Message, PhotoSize, User};

/// Keep the largest size of the photo and ask which check-in it confirms.
pub async fn photo(ctx: &BotContext, message: &Message, user: &User, sizes: &[PhotoSize]) -> AppResult<()> {
    let Some(best) = sizes.last() else {
        return Ok(());
    };

    let key = ConversationKey::new(message.chat.id, user.id);
    let mut conversation = ctx.conversation(key).await?;
    conversation.step = Step::AwaitingConfirmation;
    conversation.pending_photo = Some(PendingPhoto {
        file_id: best.file_id.clone(),
        file_unique_id: best.file_unique_id.clone(),
        received_at: Utc::now(),
    });
    ctx.save_conversation(key, conversation).await?;

    ctx.send_with(
        message.chat.id,
        texts::CHOOSE_CHECKIN,
        keyboards::checkin_choice(),
    )
    .await
}

/// `checkin:confirm:<KIND>`
pub async fn confirm(
    ctx: &BotContext,
    query: &CallbackQuery,
    key: ConversationKey,
    kind: &str,
) -> AppResult<()> {
    let Ok(kind) = kind.parse::<CheckinKind>() else {
        return ctx.answer(&query.id, None, false).await;
    };

    let now = Utc::now();
    let conversation = ctx.conversation(key).await?;
    let Some(photo) = conversation.pending_photo else {
        return ctx.answer(&query.id, Some(texts::SEND_FRESH_PHOTO), true).await;
    };
    if photo.is_stale(now) {
        ctx.clear_conversation(key).await?;
        return ctx.answer(&query.id, Some(texts::PHOTO_STALE), true).await;
    }

    let outcome = ctx
        .services
        .checkins()
        .confirm(query.from.id, kind, photo, now)
        .await?;

    let alert = match outcome {
        CheckinOutcome::NotAuthorized => texts::AUTHORIZE_FIRST,
        CheckinOutcome::DayOff => texts::NO_CHECKINS_TODAY,
        CheckinOutcome::OutsideWindow => texts::OUTSIDE_WINDOW,
        CheckinOutcome::AlreadyRecorded => texts::ALREADY_CHECKED_IN,
        CheckinOutcome::Recorded(_) => {
            ctx.clear_conversation(key).await?;
            ctx.send(key.chat_id, texts::CHECKIN_SAVED).await?;
            return ctx.answer(&query.id, None, false).await;
        }
    };
    ctx.answer(&query.id, Some(alert), true).await
}
