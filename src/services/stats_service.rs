//! Stats service - nightly aggregation of check-ins into daily rows.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

use crate::domain::{Chat, DailyAggregate, DailyStat};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::utils::yesterday_in;

use super::settings_service::effective_settings;

/// Stats service trait for dependency injection.
#[async_trait]
pub trait StatsService: Send + Sync {
    /// Aggregate one chat and day, replacing an existing row.
    async fn aggregate_chat(&self, chat: &Chat, date: NaiveDate) -> AppResult<DailyStat>;

    /// Aggregate every chat that has effective settings. Each chat uses
    /// `date` when given, otherwise its local yesterday relative to `now`.
    /// Returns the number of rows written.
    async fn aggregate_all(&self, date: Option<NaiveDate>, now: DateTime<Utc>)
        -> AppResult<usize>;
}

/// Concrete implementation of StatsService using Unit of Work.
pub struct Aggregator<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Aggregator<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> StatsService for Aggregator<U> {
    async fn aggregate_chat(&self, chat: &Chat, date: NaiveDate) -> AppResult<DailyStat> {
        let operators: Vec<i32> = self
            .uow
            .memberships()
            .list_operators(chat.id, false)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        let checkins: Vec<_> = self
            .uow
            .checkins()
            .list_for_day(chat.id, date)
            .await?
            .into_iter()
            .map(|c| (c.user_id, c.kind))
            .collect();

        let aggregate = DailyAggregate::compute(chat.id, date, &operators, &checkins);
        self.uow.stats().upsert(aggregate).await
    }

    async fn aggregate_all(
        &self,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> AppResult<usize> {
        let mut written = 0;
        for chat in self.uow.chats().list().await? {
            if effective_settings(self.uow.as_ref(), chat.id).await?.is_none() {
                tracing::debug!(chat_id = chat.chat_id, "No settings, skipping aggregation");
                continue;
            }

            let day = match date {
                Some(day) => day,
                None => yesterday_in(chat.tz()?, now),
            };
            let stat = self.aggregate_chat(&chat, day).await?;
            tracing::debug!(
                chat_id = chat.chat_id,
                date = %stat.date,
                morning = stat.morning_cnt,
                evening = stat.evening_cnt,
                operators = stat.total_operators,
                "Daily stats aggregated"
            );
            written += 1;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Checkin, CheckinKind, Membership, Misses, Role, ShiftSettings, ShiftWindows};
    use crate::services::test_support::Mocks;
    use chrono::TimeZone;
    use mockall::predicate::eq;

    fn chat(id: i32, timezone: &str) -> Chat {
        Chat {
            id,
            chat_id: -(id as i64),
            title: None,
            timezone: timezone.to_string(),
            created_at: Utc::now(),
        }
    }

    fn operator(user_id: i32, authorized: bool) -> Membership {
        Membership {
            id: user_id,
            user_id,
            chat_id: 1,
            role: Role::Operator,
            authorized,
            authorized_via: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn checkin(user_id: i32, kind: CheckinKind, date: NaiveDate) -> Checkin {
        Checkin {
            id: user_id,
            user_id,
            chat_id: 1,
            kind,
            photo_file_id: "f".to_string(),
            file_unique_id: format!("u{}", user_id),
            created_at: Utc::now(),
            checkin_date: date,
        }
    }

    fn stored(aggregate: DailyAggregate) -> DailyStat {
        DailyStat {
            id: 1,
            chat_id: aggregate.chat_id,
            date: aggregate.date,
            morning_cnt: aggregate.morning_cnt,
            evening_cnt: aggregate.evening_cnt,
            total_operators: aggregate.total_operators,
            misses: aggregate.misses,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_aggregate_counts_all_operators() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let mut mocks = Mocks::default();
        mocks
            .memberships
            .expect_list_operators()
            .with(eq(1), eq(false))
            .returning(|_, _| Ok(vec![operator(10, true), operator(11, false)]));
        mocks
            .checkins
            .expect_list_for_day()
            .returning(move |_, day| Ok(vec![checkin(10, CheckinKind::Morning, day)]));
        mocks
            .stats
            .expect_upsert()
            .returning(|aggregate| Ok(stored(aggregate)));

        let service = Aggregator::new(mocks.into_uow());
        let stat = service.aggregate_chat(&chat(1, "UTC"), date).await.unwrap();

        assert_eq!(stat.morning_cnt, 1);
        assert_eq!(stat.evening_cnt, 0);
        assert_eq!(stat.total_operators, 2);
        assert_eq!(
            stat.misses,
            Misses {
                morning: vec![11],
                evening: vec![10, 11],
            }
        );
    }

    #[tokio::test]
    async fn test_aggregate_all_uses_local_yesterday_and_skips_unconfigured() {
        let mut mocks = Mocks::default();
        mocks
            .chats
            .expect_list()
            .returning(|| Ok(vec![chat(1, "Europe/Sofia"), chat(2, "UTC")]));
        mocks
            .settings
            .expect_find_for_chat()
            .returning(|chat_id| {
                Ok((chat_id == 1).then(|| ShiftSettings {
                    id: 1,
                    chat_id: Some(1),
                    windows: ShiftWindows::default(),
                    alerts_enabled: true,
                    include_weekends: true,
                    timezone: "Europe/Sofia".to_string(),
                }))
            });
        mocks.settings.expect_find_global().returning(|| Ok(None));
        mocks
            .memberships
            .expect_list_operators()
            .returning(|_, _| Ok(Vec::new()));
        mocks
            .checkins
            .expect_list_for_day()
            .with(eq(1), eq(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()))
            .returning(|_, _| Ok(Vec::new()));
        mocks
            .stats
            .expect_upsert()
            .times(1)
            .returning(|aggregate| Ok(stored(aggregate)));

        // 22:10 UTC is already the 7th in Sofia
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 22, 10, 0).unwrap();
        let service = Aggregator::new(mocks.into_uow());
        assert_eq!(service.aggregate_all(None, now).await.unwrap(), 1);
    }
}
