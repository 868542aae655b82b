//! Report service - attendance charts, CSV exports and chat overviews.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::{sum_by_date, AttendancePoint, Chat, DailyStat, ReportPeriod};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::utils::{checkins_csv, stats_csv, ChartRenderer, ExportRow};

use super::membership_service::first_membership;

/// Rendered attendance report
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub period: ReportPeriod,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Cross-chat report for the owner
    pub summary: bool,
    /// Sum of `total_operators` for the owner, the last row's value otherwise
    pub operators: i32,
    pub chart_png: Vec<u8>,
    pub csv: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    NoMembership,
    NoData,
    Ready(Report),
}

/// Report service trait for dependency injection.
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Report for `period` ending today. The owner gets every chat summed
    /// per date, everyone else their first chat.
    async fn build(
        &self,
        telegram_id: i64,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> AppResult<ReportOutcome>;

    /// Daily rows of every chat the user belongs to, newest first.
    async fn chats_overview(&self, telegram_id: i64) -> AppResult<Vec<(Chat, DailyStat)>>;

    /// CSV of all check-ins of the user's first chat. `None` without membership.
    async fn export_checkins(&self, telegram_id: i64) -> AppResult<Option<Vec<u8>>>;
}

/// Concrete implementation of ReportService using Unit of Work.
pub struct Reporter<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    chart: ChartRenderer,
}

impl<U: UnitOfWork> Reporter<U> {
    pub fn new(uow: Arc<U>, config: Config, chart: ChartRenderer) -> Self {
        Self { uow, config, chart }
    }

    fn render(
        &self,
        period: ReportPeriod,
        (from, to): (NaiveDate, NaiveDate),
        summary: bool,
        stats: &[DailyStat],
        points: &[AttendancePoint],
    ) -> AppResult<Report> {
        let operators = if summary {
            stats.iter().map(|s| s.total_operators).sum()
        } else {
            stats.last().map(|s| s.total_operators).unwrap_or(0)
        };

        Ok(Report {
            period,
            from,
            to,
            summary,
            operators,
            chart_png: self.chart.render(points)?,
            csv: stats_csv(stats)?,
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> ReportService for Reporter<U> {
    async fn build(
        &self,
        telegram_id: i64,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> AppResult<ReportOutcome> {
        if self.config.is_owner(telegram_id) {
            let range = period.range(now.with_timezone(&self.config.timezone).date_naive());
            let stats = self.uow.stats().list_range(None, range.0, range.1).await?;
            if stats.is_empty() {
                return Ok(ReportOutcome::NoData);
            }
            let points = sum_by_date(&stats);
            return self
                .render(period, range, true, &stats, &points)
                .map(ReportOutcome::Ready);
        }

        let Some((_, membership, chat)) = first_membership(self.uow.as_ref(), telegram_id).await?
        else {
            return Ok(ReportOutcome::NoMembership);
        };
        let range = period.range(now.with_timezone(&chat.tz()?).date_naive());
        let stats = self
            .uow
            .stats()
            .list_range(Some(membership.chat_id), range.0, range.1)
            .await?;
        if stats.is_empty() {
            return Ok(ReportOutcome::NoData);
        }
        let points: Vec<AttendancePoint> = stats.iter().map(AttendancePoint::from).collect();
        self.render(period, range, false, &stats, &points)
            .map(ReportOutcome::Ready)
    }

    async fn chats_overview(&self, telegram_id: i64) -> AppResult<Vec<(Chat, DailyStat)>> {
        let Some(user) = self.uow.users().find_by_telegram_id(telegram_id).await? else {
            return Ok(Vec::new());
        };

        let mut chats = HashMap::new();
        for membership in self.uow.memberships().list_for_user(user.id).await? {
            if let Some(chat) = self.uow.chats().find_by_id(membership.chat_id).await? {
                chats.insert(chat.id, chat);
            }
        }

        let stats = self
            .uow
            .stats()
            .list_for_chats(chats.keys().copied().collect())
            .await?;
        Ok(stats
            .into_iter()
            .filter_map(|stat| chats.get(&stat.chat_id).cloned().map(|chat| (chat, stat)))
            .collect())
    }

    async fn export_checkins(&self, telegram_id: i64) -> AppResult<Option<Vec<u8>>> {
        let Some((_, _, chat)) = first_membership(self.uow.as_ref(), telegram_id).await? else {
            return Ok(None);
        };

        let checkins = self.uow.checkins().list_for_chat(chat.id).await?;
        let mut user_ids: Vec<i32> = checkins.iter().map(|c| c.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let names: HashMap<i32, String> = self
            .uow
            .users()
            .find_by_ids(user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.export_name()))
            .collect();

        let rows: Vec<ExportRow> = checkins
            .into_iter()
            .map(|c| ExportRow {
                date: c.checkin_date,
                user: names
                    .get(&c.user_id)
                    .cloned()
                    .unwrap_or_else(|| c.user_id.to_string()),
                chat_id: chat.chat_id,
                kind: c.kind,
            })
            .collect();

        checkins_csv(&rows).map(Some)
    }
}
