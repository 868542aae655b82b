//! Timezone helpers.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// Current wall-clock time in `tz`.
pub fn local_now(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Calendar day before `now` as seen in `tz`.
pub fn yesterday_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    (now.with_timezone(&tz) - Duration::days(1)).date_naive()
}
