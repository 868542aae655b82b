//! Check-in service - validates and records photo-confirmed check-ins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::parse_timezone;
use crate::domain::{is_within_window, Checkin, CheckinKind, NewCheckin, PendingPhoto};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

use super::settings_service::effective_settings;

/// Result of a check-in confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum CheckinOutcome {
    /// The user has no authorized membership
    NotAuthorized,
    /// Weekend while weekends are excluded
    DayOff,
    OutsideWindow,
    AlreadyRecorded,
    Recorded(Checkin),
}

/// Check-in service trait for dependency injection.
#[async_trait]
pub trait CheckinService: Send + Sync {
    /// Record a check-in of `kind` for the user's first authorized chat.
    async fn confirm(
        &self,
        telegram_id: i64,
        kind: CheckinKind,
        photo: PendingPhoto,
        now: DateTime<Utc>,
    ) -> AppResult<CheckinOutcome>;
}

/// Concrete implementation of CheckinService using Unit of Work.
pub struct CheckinRecorder<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CheckinRecorder<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CheckinService for CheckinRecorder<U> {
    async fn confirm(
        &self,
        telegram_id: i64,
        kind: CheckinKind,
        photo: PendingPhoto,
        now: DateTime<Utc>,
    ) -> AppResult<CheckinOutcome> {
        let Some(user) = self.uow.users().find_by_telegram_id(telegram_id).await? else {
            return Ok(CheckinOutcome::NotAuthorized);
        };
        let Some(membership) = self
            .uow
            .memberships()
            .list_authorized_for_user(user.id)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(CheckinOutcome::NotAuthorized);
        };
        let Some(chat) = self.uow.chats().find_by_id(membership.chat_id).await? else {
            return Ok(CheckinOutcome::NotAuthorized);
        };

        let settings = effective_settings(self.uow.as_ref(), chat.id).await?;
        let tz = match settings.as_ref().map(|s| parse_timezone(&s.timezone)) {
            Some(Ok(tz)) => tz,
            _ => chat.tz()?,
        };
        let local = now.with_timezone(&tz);
        let date = local.date_naive();

        if settings.as_ref().is_some_and(|s| s.is_day_off(date)) {
            return Ok(CheckinOutcome::DayOff);
        }
        if !is_within_window(settings.as_ref(), local.time(), kind) {
            return Ok(CheckinOutcome::OutsideWindow);
        }

        let checkins = self.uow.checkins();
        if checkins.exists(user.id, chat.id, kind, date).await? {
            return Ok(CheckinOutcome::AlreadyRecorded);
        }

        let created = checkins
            .create(NewCheckin {
                user_id: user.id,
                chat_id: chat.id,
                kind,
                photo_file_id: photo.file_id,
                file_unique_id: photo.file_unique_id,
                checkin_date: date,
            })
            .await;

        match created {
            Ok(checkin) => {
                tracing::info!(
                    telegram_id,
                    chat_id = chat.chat_id,
                    kind = %kind,
                    date = %date,
                    "Check-in recorded"
                );
                Ok(CheckinOutcome::Recorded(checkin))
            }
            // Lost a race with a concurrent confirmation of the same window
            Err(AppError::Conflict(_)) => Ok(CheckinOutcome::AlreadyRecorded),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chat, Membership, Role, ShiftSettings, ShiftWindows, User};
    use crate::services::test_support::Mocks;
    use chrono::{NaiveDate, TimeZone};

    fn photo() -> PendingPhoto {
        PendingPhoto {
            file_id: "file".to_string(),
            file_unique_id: "unique".to_string(),
            received_at: Utc::now(),
        }
    }

    /// Authorized operator of chat 5 with the given effective settings
    fn operator(mocks: &mut Mocks, settings: Option<ShiftSettings>) {
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
        mocks
            .memberships
            .expect_list_authorized_for_user()
            .returning(|user_id| {
                Ok(vec![Membership {
                    id: 1,
                    user_id,
                    chat_id: 5,
                    role: Role::Operator,
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
                title: None,
                timezone: "UTC".to_string(),
                created_at: Utc::now(),
            }))
        });
        mocks
            .settings
            .expect_find_for_chat()
            .returning(move |_| Ok(settings.clone()));
        mocks.settings.expect_find_global().returning(|| Ok(None));
    }

    fn weekend_free(timezone: &str) -> ShiftSettings {
        ShiftSettings {
            id: 1,
            chat_id: Some(5),
            windows: ShiftWindows::default(),
            alerts_enabled: true,
            include_weekends: false,
            timezone: timezone.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_authorized() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_telegram_id()
            .returning(|_| Ok(None));

        let service = CheckinRecorder::new(mocks.into_uow());
        let outcome = service
            .confirm(42, CheckinKind::Morning, photo(), Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome, CheckinOutcome::NotAuthorized);
    }

    #[tokio::test]
    async fn test_weekend_is_a_day_off() {
        let mut mocks = Mocks::default();
        operator(&mut mocks, Some(weekend_free("UTC")));

        // Saturday
        let now = Utc.with_ymd_and_hms(2024, 5, 4, 8, 0, 0).unwrap();
        let service = CheckinRecorder::new(mocks.into_uow());
        let outcome = service
            .confirm(42, CheckinKind::Morning, photo(), now)
            .await
            .unwrap();
        assert_eq!(outcome, CheckinOutcome::DayOff);
    }

    #[tokio::test]
    async fn test_outside_window_uses_settings_timezone() {
        let mut mocks = Mocks::default();
        operator(&mut mocks, Some(weekend_free("Asia/Tokyo")));

        // Monday 08:00 UTC is 17:00 in Tokyo
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap();
        let service = CheckinRecorder::new(mocks.into_uow());
        let outcome = service
            .confirm(42, CheckinKind::Morning, photo(), now)
            .await
            .unwrap();
        assert_eq!(outcome, CheckinOutcome::OutsideWindow);
    }

    #[tokio::test]
    async fn test_existing_checkin_is_reported() {
        let mut mocks = Mocks::default();
        operator(&mut mocks, None);
        mocks.checkins.expect_exists().returning(|_, _, _, _| Ok(true));

        let now = Utc.with_ymd_and_hms(2024, 5, 6, 17, 0, 0).unwrap();
        let service = CheckinRecorder::new(mocks.into_uow());
        let outcome = service
            .confirm(42, CheckinKind::Evening, photo(), now)
            .await
            .unwrap();
        assert_eq!(outcome, CheckinOutcome::AlreadyRecorded);
    }

    #[tokio::test]
    async fn test_unique_violation_race_is_reported_as_existing() {
        let mut mocks = Mocks::default();
        operator(&mut mocks, None);
        mocks.checkins.expect_exists().returning(|_, _, _, _| Ok(false));
        mocks
            .checkins
            .expect_create()
            .returning(|_| Err(AppError::conflict("Check-in")));

        let now = Utc.with_ymd_and_hms(2024, 5, 6, 6, 0, 0).unwrap();
        let service = CheckinRecorder::new(mocks.into_uow());
        let outcome = service
            .confirm(42, CheckinKind::Morning, photo(), now)
            .await
            .unwrap();
        assert_eq!(outcome, CheckinOutcome::AlreadyRecorded);
    }

    #[tokio::test]
    async fn test_checkin_recorded_on_local_date() {
        let mut mocks = Mocks::default();
        operator(&mut mocks, None);
        mocks.checkins.expect_exists().returning(|_, _, _, _| Ok(false));
        mocks.checkins.expect_create().returning(|new| {
            Ok(Checkin {
                id: 1,
                user_id: new.user_id,
                chat_id: new.chat_id,
                kind: new.kind,
                photo_file_id: new.photo_file_id,
                file_unique_id: new.file_unique_id,
                created_at: Utc::now(),
                checkin_date: new.checkin_date,
            })
        });

        let now = Utc.with_ymd_and_hms(2024, 5, 6, 11, 0, 0).unwrap();
        let service = CheckinRecorder::new(mocks.into_uow());
        match service
            .confirm(42, CheckinKind::Morning, photo(), now)
            .await
            .unwrap()
        {
            CheckinOutcome::Recorded(checkin) => {
                assert_eq!(checkin.checkin_date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
                assert_eq!(checkin.file_unique_id, "unique");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
