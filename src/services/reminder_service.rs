//! Reminder service - finds operators who have not checked in yet.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{Chat, CheckinKind};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

use super::settings_service::effective_settings;

/// Group reminder about missing check-ins
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReminder {
    pub chat: Chat,
    pub kind: CheckinKind,
    /// Mentions of the missing operators
    pub names: Vec<String>,
}

/// Reminder service trait for dependency injection.
#[async_trait]
pub trait ReminderService: Send + Sync {
    /// Reminders due at `now` across all chats.
    async fn due_reminders(&self, now: DateTime<Utc>) -> AppResult<Vec<PendingReminder>>;
}

/// Concrete implementation of ReminderService using Unit of Work.
pub struct ReminderPlanner<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ReminderPlanner<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn reminder_for(&self, chat: Chat, now: DateTime<Utc>) -> AppResult<Option<PendingReminder>> {
        let Some(settings) = effective_settings(self.uow.as_ref(), chat.id).await? else {
            return Ok(None);
        };
        if !settings.alerts_enabled {
            return Ok(None);
        }

        let local = now.with_timezone(&chat.tz()?);
        let today = local.date_naive();
        if settings.is_day_off(today) {
            return Ok(None);
        }
        let Some(kind) = settings.windows.active(local.time()) else {
            return Ok(None);
        };

        let done: HashSet<i32> = self
            .uow
            .checkins()
            .list_for_day(chat.id, today)
            .await?
            .into_iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.user_id)
            .collect();
        let missing: Vec<i32> = self
            .uow
            .memberships()
            .list_operators(chat.id, true)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .filter(|user_id| !done.contains(user_id))
            .collect();
        if missing.is_empty() {
            return Ok(None);
        }

        let users: HashMap<i32, String> = self
            .uow
            .users()
            .find_by_ids(missing.clone())
            .await?
            .into_iter()
            .map(|u| (u.id, u.mention()))
            .collect();
        let names = missing
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect();

        Ok(Some(PendingReminder { chat, kind, names }))
    }
}

#[async_trait]
impl<U: UnitOfWork> ReminderService for ReminderPlanner<U> {
    async fn due_reminders(&self, now: DateTime<Utc>) -> AppResult<Vec<PendingReminder>> {
        let mut reminders = Vec::new();
        for chat in self.uow.chats().list().await? {
            let chat_id = chat.chat_id;
            match self.reminder_for(chat, now).await {
                Ok(Some(reminder)) => reminders.push(reminder),
                Ok(None) => {}
                Err(e) => tracing::error!(chat_id, error = %e, "Failed to evaluate reminders"),
            }
        }
        Ok(reminders)
    }
}
