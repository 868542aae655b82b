//! Settings service - shift windows, alerts and weekend handling.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::{Chat, NewShiftSettings, SettingsToggle, ShiftSettings};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

use super::membership_service::first_membership;

/// The chat's own settings row, else the global default row.
pub(crate) async fn effective_settings<U: UnitOfWork>(
    uow: &U,
    chat_id: i32,
) -> AppResult<Option<ShiftSettings>> {
    let settings = uow.settings();
    match settings.find_for_chat(chat_id).await? {
        Some(own) => Ok(Some(own)),
        None => settings.find_global().await,
    }
}

/// Outcome of a settings request
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAccess {
    /// The user is in no chat
    NoMembership,
    /// Neither a manager of the chat nor the owner
    NotManager,
    Granted {
        chat: Chat,
        settings: ShiftSettings,
    },
}

/// Settings service trait for dependency injection.
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// Create the global row (chat_id NULL) when it is missing.
    async fn ensure_global_defaults(&self) -> AppResult<ShiftSettings>;

    /// Settings of the user's first chat, created from defaults when missing.
    async fn open(&self, telegram_id: i64) -> AppResult<SettingsAccess>;

    /// Flip one flag of the user's first chat.
    async fn toggle(&self, telegram_id: i64, toggle: SettingsToggle) -> AppResult<SettingsAccess>;
}

/// Concrete implementation of SettingsService using Unit of Work.
pub struct SettingsManager<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> SettingsManager<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    async fn chat_settings(&self, chat: &Chat) -> AppResult<ShiftSettings> {
        let settings = self.uow.settings();
        match settings.find_for_chat(chat.id).await? {
            Some(existing) => Ok(existing),
            None => {
                settings
                    .create(NewShiftSettings::defaults(Some(chat.id), chat.timezone.clone()))
                    .await
            }
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> SettingsService for SettingsManager<U> {
    async fn ensure_global_defaults(&self) -> AppResult<ShiftSettings> {
        let settings = self.uow.settings();
        if let Some(global) = settings.find_global().await? {
            return Ok(global);
        }

        let created = settings
            .create(NewShiftSettings::defaults(None, self.config.timezone.name()))
            .await?;
        tracing::info!(timezone = %created.timezone, "Global default settings created");
        Ok(created)
    }

    async fn open(&self, telegram_id: i64) -> AppResult<SettingsAccess> {
        let Some((_, membership, chat)) = first_membership(self.uow.as_ref(), telegram_id).await?
        else {
            return Ok(SettingsAccess::NoMembership);
        };
        if !membership.role.is_manager() && !self.config.is_owner(telegram_id) {
            return Ok(SettingsAccess::NotManager);
        }

        let settings = self.chat_settings(&chat).await?;
        Ok(SettingsAccess::Granted { chat, settings })
    }

    async fn toggle(&self, telegram_id: i64, toggle: SettingsToggle) -> AppResult<SettingsAccess> {
        let (chat, current) = match self.open(telegram_id).await? {
            SettingsAccess::Granted { chat, settings } => (chat, settings),
            denied => return Ok(denied),
        };

        let (alerts, weekends) = match toggle {
            SettingsToggle::Alerts => (!current.alerts_enabled, current.include_weekends),
            SettingsToggle::Weekends => (current.alerts_enabled, !current.include_weekends),
        };
        let settings = self
            .uow
            .settings()
            .update_flags(current.id, alerts, weekends)
            .await?;

        tracing::info!(
            chat_id = chat.chat_id,
            setting = toggle.key(),
            alerts_enabled = settings.alerts_enabled,
            include_weekends = settings.include_weekends,
            "Settings toggled"
        );

        Ok(SettingsAccess::Granted { chat, settings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Membership, Role, ShiftWindows, User};
    use crate::services::test_support::Mocks;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn settings(id: i32, chat_id: Option<i32>) -> ShiftSettings {
        ShiftSettings {
            id,
            chat_id,
            windows: ShiftWindows::default(),
            alerts_enabled: true,
            include_weekends: true,
            timezone: "Europe/Sofia".to_string(),
        }
    }

    fn member_of(mocks: &mut Mocks, role: Role) {
        mocks.users.expect_find_by_telegram_id().returning(|telegram_id| {
            Ok(Some(User {
                id: 1,
                telegram_id,
                username: None,
                full_name: None,
                phone_last4: None,
                phone_sha256: None,
                phone_verified_at: None,
                dm_blocked: false,
                locale: None,
                created_at: Utc::now(),
            }))
        });
        mocks.memberships.expect_list_for_user().returning(move |user_id| {
            Ok(vec![Membership {
                id: 1,
                user_id,
                chat_id: 5,
                role,
                authorized: true,
                authorized_via: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }])
        });
        mocks.chats.expect_find_by_id().returning(|id| {
            Ok(Some(Chat {
                id,
                chat_id: -100,
                title: Some("Shop".to_string()),
                timezone: "Europe/Sofia".to_string(),
                created_at: Utc::now(),
            }))
        });
    }

    #[tokio::test]
    async fn test_global_defaults_created_once() {
        let mut mocks = Mocks::default();
        mocks.settings.expect_find_global().returning(|| Ok(None));
        mocks
            .settings
            .expect_create()
            .withf(|new| new.chat_id.is_none() && new.timezone == "Europe/Sofia")
            .times(1)
            .returning(|_| Ok(settings(1, None)));

        let service = SettingsManager::new(mocks.into_uow(), Config::default());
        assert!(service.ensure_global_defaults().await.unwrap().is_global());
    }

    #[tokio::test]
    async fn test_operator_cannot_open_settings() {
        let mut mocks = Mocks::default();
        member_of(&mut mocks, Role::Operator);

        let service = SettingsManager::new(mocks.into_uow(), Config::default());
        assert_eq!(service.open(42).await.unwrap(), SettingsAccess::NotManager);
    }

    #[tokio::test]
    async fn test_toggle_alerts_for_manager() {
        let mut mocks = Mocks::default();
        member_of(&mut mocks, Role::Manager);
        mocks
            .settings
            .expect_find_for_chat()
            .with(eq(5))
            .returning(|chat_id| Ok(Some(settings(9, Some(chat_id)))));
        mocks
            .settings
            .expect_update_flags()
            .with(eq(9), eq(false), eq(true))
            .returning(|id, alerts, weekends| {
                let mut updated = settings(id, Some(5));
                updated.alerts_enabled = alerts;
                updated.include_weekends = weekends;
                Ok(updated)
            });

        let service = SettingsManager::new(mocks.into_uow(), Config::default());
        match service.toggle(42, SettingsToggle::Alerts).await.unwrap() {
            SettingsAccess::Granted { settings, .. } => assert!(!settings.alerts_enabled),
            other => panic!("unexpected {:?}", other),
        }
    }
}
