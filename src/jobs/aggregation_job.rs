//! Aggregation job - nightly `daily_stats` rollup.

use chrono::{NaiveDate, Utc};

use crate::config::{DEFAULT_LOCK_TTL_SECONDS, LOCK_RESOURCE_AGGREGATION};
use crate::errors::AppResult;
use crate::infra::Cache;
use crate::services::StatsService;

/// Aggregate every configured chat for `date` (default: each chat's local
/// yesterday).
///
/// With a cache the run is guarded by a distributed lock so that only one
/// replica aggregates; `Ok(None)` means another replica holds it.
pub async fn run_aggregation(
    stats: &dyn StatsService,
    cache: Option<&Cache>,
    date: Option<NaiveDate>,
) -> AppResult<Option<usize>> {
    let guard = match cache {
        Some(cache) => {
            match cache
                .try_acquire_lock(LOCK_RESOURCE_AGGREGATION, DEFAULT_LOCK_TTL_SECONDS)
                .await?
            {
                Some(guard) => Some(guard),
                None => {
                    tracing::info!("Aggregation already running elsewhere, skipping");
                    return Ok(None);
                }
            }
        }
        None => None,
    };

    let written = stats.aggregate_all(date, Utc::now()).await?;
    tracing::info!(rows = written, date = ?date, "Daily stats aggregated");

    if let Some(guard) = guard {
        guard.release().await?;
    }
    Ok(Some(written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Mutex;

    use crate::domain::{Chat, DailyStat};

    #[derive(Default)]
    struct RecordingStats {
        dates: Mutex<Vec<Option<NaiveDate>>>,
    }

    #[async_trait]
    impl StatsService for RecordingStats {
        async fn aggregate_chat(&self, _chat: &Chat, _date: NaiveDate) -> AppResult<DailyStat> {
            unreachable!("aggregate_all is the job entry point")
        }

        async fn aggregate_all(
            &self,
            date: Option<NaiveDate>,
            _now: DateTime<Utc>,
        ) -> AppResult<usize> {
            self.dates.lock().unwrap().push(date);
            Ok(3)
        }
    }

    #[tokio::test]
    async fn test_runs_unguarded_without_cache() {
        let stats = RecordingStats::default();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1);

        let written = run_aggregation(&stats, None, date).await.unwrap();

        assert_eq!(written, Some(3));
        assert_eq!(*stats.dates.lock().unwrap(), vec![date]);
    }
}
