//! Notification service - outbound group messages with pacing and retries.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::reminder_service::PendingReminder;
use crate::config::{MAX_SEND_ATTEMPTS, RATE_LIMIT_PER_SECOND};
use crate::telegram::{BotApi, TelegramError};

/// `⚠️ В чате {title} еще не отметились за {утро|вечер}: {names}`
pub fn reminder_text(reminder: &PendingReminder) -> String {
    format!(
        "⚠️ В чате {} еще не отметились за {}: {}",
        reminder.chat.display_title(),
        reminder.kind.window_label(),
        reminder.names.join(", ")
    )
}

/// Notification service trait for dependency injection.
///
/// Delivery failures are logged, never returned.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_reminder(&self, reminder: &PendingReminder);

    async fn send_text(&self, chat_id: i64, text: String);
}

/// Rate-limited sender on top of the Bot API
pub struct Notifier {
    bot: Arc<dyn BotApi>,
    min_interval: Duration,
    next_slot: Mutex<Instant>,
}

impl Notifier {
    pub fn new(bot: Arc<dyn BotApi>) -> Self {
        Self::with_rate(bot, RATE_LIMIT_PER_SECOND)
    }

    pub fn with_rate(bot: Arc<dyn BotApi>, per_second: u32) -> Self {
        Self {
            bot,
            min_interval: Duration::from_secs(1) / per_second.max(1),
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Wait for the next free send slot.
    async fn throttle(&self) {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        if *next_slot > now {
            tokio::time::sleep_until(*next_slot).await;
        }
        *next_slot = Instant::now().max(*next_slot) + self.min_interval;
    }
}

#[async_trait]
impl NotificationService for Notifier {
    async fn send_reminder(&self, reminder: &PendingReminder) {
        self.send_text(reminder.chat.chat_id, reminder_text(reminder))
            .await;
    }

    async fn send_text(&self, chat_id: i64, text: String) {
        for attempt in 1..=MAX_SEND_ATTEMPTS {
            self.throttle().await;
            match self.bot.send_message(chat_id, text.clone(), None).await {
                Ok(()) => return,
                Err(TelegramError::RetryAfter(seconds)) if attempt < MAX_SEND_ATTEMPTS => {
                    let delay = seconds + 1;
                    tracing::warn!(chat_id, attempt, delay, "Rate limited, retrying");
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                }
                Err(TelegramError::Forbidden(reason)) => {
                    tracing::info!(chat_id, reason = %reason, "Bot blocked by chat");
                    return;
                }
                Err(e) => {
                    tracing::error!(chat_id, attempt, error = %e, "Failed to send message");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chat, CheckinKind};
    use crate::telegram::MockBotApi;
    use chrono::Utc;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn reminder() -> PendingReminder {
        PendingReminder {
            chat: Chat {
                id: 1,
                chat_id: -100,
                title: Some("Shop".to_string()),
                timezone: "UTC".to_string(),
                created_at: Utc::now(),
            },
            kind: CheckinKind::Evening,
            names: vec!["@anna".to_string(), "Ivan".to_string()],
        }
    }

    #[test]
    fn test_reminder_text() {
        assert_eq!(
            reminder_text(&reminder()),
            "⚠️ В чате Shop еще не отметились за вечер: @anna, Ivan"
        );
    }

    #[tokio::test]
    async fn test_retry_after_flood_control() {
        let mut bot = MockBotApi::new();
        let mut seq = Sequence::new();
        bot.expect_send_message()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(TelegramError::RetryAfter(0)));
        bot.expect_send_message()
            .with(eq(-100_i64), eq(reminder_text(&reminder())), eq(None))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let notifier = Notifier::new(Arc::new(bot));
        notifier.send_reminder(&reminder()).await;
    }

    #[tokio::test]
    async fn test_blocked_bot_is_not_retried() {
        let mut bot = MockBotApi::new();
        bot.expect_send_message()
            .times(1)
            .returning(|_, _, _| Err(TelegramError::Forbidden("blocked".to_string())));

        let notifier = Notifier::new(Arc::new(bot));
        notifier.send_text(-100, "hi".to_string()).await;
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let mut bot = MockBotApi::new();
        bot.expect_send_message()
            .times(MAX_SEND_ATTEMPTS as usize)
            .returning(|_, _, _| Err(TelegramError::RetryAfter(0)));

        let notifier = Notifier::with_rate(Arc::new(bot), 1000);
        notifier.send_text(-100, "hi".to_string()).await;
    }
}
