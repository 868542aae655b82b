//! CSV exports attached to reports.

use chrono::NaiveDate;

use crate::domain::{CheckinKind, DailyStat};
use crate::errors::{AppError, AppResult};

/// One row of the check-in export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub user: String,
    pub chat_id: i64,
    pub kind: CheckinKind,
}

/// `date,morning,evening,total,misses` with misses as JSON.
pub fn stats_csv(stats: &[DailyStat]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "morning", "evening", "total", "misses"])
        .map_err(csv_error)?;

    for stat in stats {
        let misses = serde_json::to_string(&stat.misses)
            .map_err(|e| AppError::internal(format!("Failed to encode misses: {}", e)))?;
        writer
            .write_record([
                stat.date.to_string(),
                stat.morning_cnt.to_string(),
                stat.evening_cnt.to_string(),
                stat.total_operators.to_string(),
                misses,
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// `date,user,chat,type,status`; every stored check-in is `done`.
pub fn checkins_csv(rows: &[ExportRow]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "user", "chat", "type", "status"])
        .map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.date.to_string(),
                row.user.clone(),
                row.chat_id.to_string(),
                row.kind.as_str().to_string(),
                "done".to_string(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> AppResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("Failed to flush CSV: {}", e)))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::internal(format!("Failed to write CSV: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Misses;
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_stats_csv_layout() {
        let stats = vec![DailyStat {
            id: 1,
            chat_id: 1,
            date: day(6),
            morning_cnt: 2,
            evening_cnt: 1,
            total_operators: 3,
            misses: Misses {
                morning: vec![7],
                evening: vec![7, 8],
            },
            created_at: Utc::now(),
        }];

        let csv = String::from_utf8(stats_csv(&stats).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("date,morning,evening,total,misses"));
        assert_eq!(
            lines.next(),
            Some(r#"2024-05-06,2,1,3,"{""morning"":[7],""evening"":[7,8]}""#)
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_checkins_csv_layout() {
        let rows = vec![ExportRow {
            date: day(7),
            user: "Ivan, Petrov".to_string(),
            chat_id: -100,
            kind: CheckinKind::Evening,
        }];

        let csv = String::from_utf8(checkins_csv(&rows).unwrap()).unwrap();
        assert_eq!(
            csv,
            "date,user,chat,type,status\n2024-05-07,\"Ivan, Petrov\",-100,EVENING,done\n"
        );
    }
}
