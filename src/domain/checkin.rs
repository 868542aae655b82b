//! Photo-confirmed shift check-ins.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::roles::CheckinKind;

/// Stored check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkin {
    pub id: i32,
    pub user_id: i32,
    pub chat_id: i32,
    pub kind: CheckinKind,
    pub photo_file_id: String,
    pub file_unique_id: String,
    pub created_at: DateTime<Utc>,
    /// Local date in the chat timezone
    pub checkin_date: NaiveDate,
}

/// Check-in about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckin {
    pub user_id: i32,
    pub chat_id: i32,
    pub kind: CheckinKind,
    pub photo_file_id: String,
    pub file_unique_id: String,
    pub checkin_date: NaiveDate,
}
