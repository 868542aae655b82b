//! Reporting commands.

use chrono::Utc;

use crate::bot::{keyboards, texts, BotContext};
use crate::domain::ReportPeriod;
use crate::errors::AppResult;
use crate::services::ReportOutcome;
use crate::telegram::types::{CallbackQuery, InputFile, Message, User};

/// `/report` and `/dashboard` - period picker.
pub async fn menu(ctx: &BotContext, message: &Message, title: &str) -> AppResult<()> {
    ctx.send_with(message.chat.id, title, keyboards::report_periods())
        .await
}

/// `report:period:<key>` - chart and CSV for the chosen period.
pub async fn period(ctx: &BotContext, query: &CallbackQuery, chat_id: i64, key: &str) -> AppResult<()> {
    let Some(period) = ReportPeriod::from_key(key) else {
        return ctx.answer(&query.id, None, false).await;
    };

    let outcome = ctx
        .services
        .reports()
        .build(query.from.id, period, Utc::now())
        .await?;

    let report = match outcome {
        ReportOutcome::NoMembership => {
            return ctx.answer(&query.id, Some(texts::NOT_AUTHORIZED), true).await
        }
        ReportOutcome::NoData => return ctx.answer(&query.id, Some(texts::NO_DATA), true).await,
        ReportOutcome::Ready(report) => report,
    };

    let caption = texts::report_caption(&report);
    ctx.send_photo(
        chat_id,
        InputFile::new("report.png", report.chart_png),
        caption,
    )
    .await?;
    ctx.send_document(
        chat_id,
        InputFile::new("report.csv", report.csv),
        texts::EXPORT_CAPTION,
    )
    .await?;
    ctx.answer(&query.id, None, false).await
}

/// `/chats` - daily rows of every chat the user is in.
pub async fn chats(ctx: &BotContext, message: &Message, user: &User) -> AppResult<()> {
    let rows = ctx.services.reports().chats_overview(user.id).await?;
    if rows.is_empty() {
        return ctx.send(message.chat.id, texts::NO_STATS).await;
    }
    ctx.send(message.chat.id, texts::chats_overview(&rows)).await
}

/// `/export` - every check-in of the user's chat as CSV.
pub async fn export(ctx: &BotContext, message: &Message, user: &User) -> AppResult<()> {
    match ctx.services.reports().export_checkins(user.id).await? {
        Some(csv) => {
            ctx.send_document(
                message.chat.id,
                InputFile::new("export.csv", csv),
                texts::EXPORT_CAPTION,
            )
            .await
        }
        None => ctx.send(message.chat.id, texts::NO_ACCESS).await,
    }
}
