//! In-process job scheduler.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::{run_aggregation, run_reminders};
use crate::config::{Config, AGGREGATION_CRON, REMINDER_INTERVAL_SECONDS};
use crate::errors::{AppError, AppResult};
use crate::infra::Cache;
use crate::services::{NotificationService, ReminderService, ServiceContainer, StatsService};

/// Parse a six-field cron expression (seconds first).
pub fn parse_schedule(expression: &str) -> AppResult<Schedule> {
    Schedule::from_str(expression)
        .map_err(|e| AppError::config(format!("Invalid cron expression {}: {}", expression, e)))
}

/// Next fire time of `schedule` after `now`, evaluated in `timezone`.
pub fn next_run(schedule: &Schedule, timezone: Tz, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule
        .after(&now.with_timezone(&timezone))
        .next()
        .map(|at| at.with_timezone(&Utc))
}

/// Runs reminders on a fixed interval and aggregation on a cron schedule.
pub struct Scheduler {
    stats: Arc<dyn StatsService>,
    reminders: Arc<dyn ReminderService>,
    notifications: Arc<dyn NotificationService>,
    cache: Option<Cache>,
    timezone: Tz,
    aggregation: Schedule,
    reminder_every: Duration,
}

impl Scheduler {
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        cache: Option<Cache>,
        config: &Config,
    ) -> AppResult<Self> {
        Ok(Self {
            stats: services.stats(),
            reminders: services.reminders(),
            notifications: services.notifications(),
            cache,
            timezone: config.scheduler_timezone,
            aggregation: parse_schedule(AGGREGATION_CRON)?,
            reminder_every: Duration::from_secs(REMINDER_INTERVAL_SECONDS),
        })
    }

    /// Loop until `shutdown` flips to true. Job failures are logged and the
    /// loop keeps going.
    ///
    /// The pending aggregation time survives iterations, so a reminder run
    /// that overlaps it delays the aggregation instead of skipping the day.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut reminders = tokio::time::interval(self.reminder_every);
        reminders.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            timezone = self.timezone.name(),
            cron = AGGREGATION_CRON,
            "Scheduler started"
        );

        let mut pending = next_run(&self.aggregation, self.timezone, Utc::now());
        loop {
            let until_aggregation = match pending {
                Some(at) => (at - Utc::now()).to_std().unwrap_or(Duration::ZERO),
                None => Duration::from_secs(60),
            };

            tokio::select! {
                _ = reminders.tick() => self.remind().await,
                _ = tokio::time::sleep(until_aggregation) => {}
                _ = shutdown.changed() => break,
            }
            if *shutdown.borrow() {
                break;
            }

            let now = Utc::now();
            match pending {
                Some(at) if at <= now => {
                    self.aggregate().await;
                    pending = next_run(&self.aggregation, self.timezone, at.max(now));
                }
                Some(_) => {}
                None => pending = next_run(&self.aggregation, self.timezone, now),
            }
        }

        tracing::info!("Scheduler stopped");
    }

    async fn remind(&self) {
        let result = run_reminders(
            self.reminders.as_ref(),
            self.notifications.as_ref(),
            Utc::now(),
        )
        .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "Reminder job failed");
        }
    }

    async fn aggregate(&self) {
        let result = run_aggregation(self.stats.as_ref(), self.cache.as_ref(), None).await;
        if let Err(e) = result {
            tracing::error!(error = %e, "Aggregation job failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Timelike};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::{Chat, DailyStat};
    use crate::services::PendingReminder;

    struct SlowReminders(Duration);

    #[async_trait]
    impl ReminderService for SlowReminders {
        async fn due_reminders(&self, _now: DateTime<Utc>) -> AppResult<Vec<PendingReminder>> {
            tokio::time::sleep(self.0).await;
            Ok(Vec::new())
        }
    }

    struct SilentNotifier;

    #[async_trait]
    impl NotificationService for SilentNotifier {
        async fn send_reminder(&self, _reminder: &PendingReminder) {}

        async fn send_text(&self, _chat_id: i64, _text: String) {}
    }

    #[derive(Default)]
    struct CountingStats {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl StatsService for CountingStats {
        async fn aggregate_chat(&self, _chat: &Chat, _date: NaiveDate) -> AppResult<DailyStat> {
            unreachable!("the scheduler only calls aggregate_all")
        }

        async fn aggregate_all(
            &self,
            _date: Option<NaiveDate>,
            _now: DateTime<Utc>,
        ) -> AppResult<usize> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    /// Cron expression firing once, two seconds from now.
    fn two_seconds_from_now() -> Schedule {
        let at = Utc::now() + chrono::Duration::seconds(2);
        parse_schedule(&format!("{} {} {} * * *", at.second(), at.minute(), at.hour())).unwrap()
    }

    async fn aggregation_runs(reminder_duration: Duration) -> usize {
        let stats = Arc::new(CountingStats::default());
        let scheduler = Scheduler {
            stats: stats.clone(),
            reminders: Arc::new(SlowReminders(reminder_duration)),
            notifications: Arc::new(SilentNotifier),
            cache: None,
            timezone: Tz::UTC,
            aggregation: two_seconds_from_now(),
            reminder_every: Duration::from_secs(3600),
        };

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(scheduler.run(rx));
        tokio::time::sleep(Duration::from_secs(6)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        stats.runs.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_aggregation_fires_on_schedule() {
        assert_eq!(aggregation_runs(Duration::ZERO).await, 1);
    }

    #[tokio::test]
    async fn test_aggregation_survives_overlapping_reminder_run() {
        // The first reminder tick is immediate and still running at fire time
        assert_eq!(aggregation_runs(Duration::from_secs(4)).await, 1);
    }

    #[test]
    fn test_aggregation_runs_ten_past_midnight_local() {
        let schedule = parse_schedule(AGGREGATION_CRON).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let utc = next_run(&schedule, Tz::UTC, now).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 5, 2, 0, 10, 0).unwrap());

        // Sofia is UTC+3 in summer
        let sofia = next_run(&schedule, Tz::Europe__Sofia, now).unwrap();
        assert_eq!(sofia, Utc.with_ymd_and_hms(2024, 5, 1, 21, 10, 0).unwrap());
    }

    #[test]
    fn test_invalid_expression_is_config_error() {
        assert!(matches!(parse_schedule("every night"), Err(AppError::Config(_))));
    }
}
