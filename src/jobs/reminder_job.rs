//! Reminder job - posts missing check-ins to group chats.

use chrono::{DateTime, Utc};

use crate::errors::AppResult;
use crate::services::{NotificationService, ReminderService};

/// Send every reminder due at `now`. Returns the number of reminders sent.
pub async fn run_reminders(
    reminders: &dyn ReminderService,
    notifications: &dyn NotificationService,
    now: DateTime<Utc>,
) -> AppResult<usize> {
    let due = reminders.due_reminders(now).await?;
    for reminder in &due {
        tracing::info!(
            chat_id = reminder.chat.chat_id,
            kind = %reminder.kind,
            missing = reminder.names.len(),
            "Sending reminder"
        );
        notifications.send_reminder(reminder).await;
    }
    Ok(due.len())
}
