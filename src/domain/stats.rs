//! Daily attendance statistics and report periods.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::roles::CheckinKind;

/// User ids (database ids) that missed a window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Misses {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub morning: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evening: Vec<i32>,
}

/// Stored daily aggregate for one chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub id: i32,
    pub chat_id: i32,
    pub date: NaiveDate,
    pub morning_cnt: i32,
    pub evening_cnt: i32,
    pub total_operators: i32,
    pub misses: Misses,
    pub created_at: DateTime<Utc>,
}

/// Aggregate computed for one chat and day, ready to upsert
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    pub chat_id: i32,
    pub date: NaiveDate,
    pub morning_cnt: i32,
    pub evening_cnt: i32,
    pub total_operators: i32,
    pub misses: Misses,
}

impl DailyAggregate {
    /// Count the day's check-ins and collect operators missing each window.
    ///
    /// `operators` are user ids of the chat's OPERATOR memberships,
    /// `checkins` are (user id, kind) pairs for the day.
    pub fn compute(
        chat_id: i32,
        date: NaiveDate,
        operators: &[i32],
        checkins: &[(i32, CheckinKind)],
    ) -> Self {
        let count = |kind: CheckinKind| checkins.iter().filter(|(_, k)| *k == kind).count() as i32;
        let done = |kind: CheckinKind| -> HashSet<i32> {
            checkins
                .iter()
                .filter(|(_, k)| *k == kind)
                .map(|(user_id, _)| *user_id)
                .collect()
        };
        let morning_done = done(CheckinKind::Morning);
        let evening_done = done(CheckinKind::Evening);

        let misses = Misses {
            morning: operators
                .iter()
                .copied()
                .filter(|id| !morning_done.contains(id))
                .collect(),
            evening: operators
                .iter()
                .copied()
                .filter(|id| !evening_done.contains(id))
                .collect(),
        };

        Self {
            chat_id,
            date,
            morning_cnt: count(CheckinKind::Morning),
            evening_cnt: count(CheckinKind::Evening),
            total_operators: operators.len() as i32,
            misses,
        }
    }
}

/// One point of the attendance chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendancePoint {
    pub date: NaiveDate,
    pub morning: i32,
    pub evening: i32,
}

impl From<&DailyStat> for AttendancePoint {
    fn from(stat: &DailyStat) -> Self {
        Self {
            date: stat.date,
            morning: stat.morning_cnt,
            evening: stat.evening_cnt,
        }
    }
}

/// Sum rows of several chats per date, ordered by date.
pub fn sum_by_date(stats: &[DailyStat]) -> Vec<AttendancePoint> {
    let mut buckets: BTreeMap<NaiveDate, (i32, i32)> = BTreeMap::new();
    for stat in stats {
        let bucket = buckets.entry(stat.date).or_default();
        bucket.0 += stat.morning_cnt;
        bucket.1 += stat.evening_cnt;
    }
    buckets
        .into_iter()
        .map(|(date, (morning, evening))| AttendancePoint {
            date,
            morning,
            evening,
        })
        .collect()
}

/// Report periods offered by /report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Today,
    Week,
    Month,
    HalfYear,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 4] = [
        ReportPeriod::Today,
        ReportPeriod::Week,
        ReportPeriod::Month,
        ReportPeriod::HalfYear,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ReportPeriod::Today => "today",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
            ReportPeriod::HalfYear => "halfyear",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|period| period.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportPeriod::Today => "Сегодня",
            ReportPeriod::Week => "Неделя",
            ReportPeriod::Month => "Месяц",
            ReportPeriod::HalfYear => "Полгода",
        }
    }

    /// Days before `today` included in the period
    fn days_back(&self) -> i64 {
        match self {
            ReportPeriod::Today => 0,
            ReportPeriod::Week => 6,
            ReportPeriod::Month => 29,
            ReportPeriod::HalfYear => 182,
        }
    }

    /// Inclusive date range ending today.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today - Duration::days(self.days_back()), today)
    }
}
