//! Shift windows and per-chat schedule settings.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::roles::CheckinKind;
use crate::config::{
    DEFAULT_EVENING_END, DEFAULT_EVENING_START, DEFAULT_MORNING_END, DEFAULT_MORNING_START,
};

/// Morning and evening check-in windows. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindows {
    pub morning_start: NaiveTime,
    pub morning_end: NaiveTime,
    pub evening_start: NaiveTime,
    pub evening_end: NaiveTime,
}

impl Default for ShiftWindows {
    fn default() -> Self {
        Self {
            morning_start: hm(DEFAULT_MORNING_START),
            morning_end: hm(DEFAULT_MORNING_END),
            evening_start: hm(DEFAULT_EVENING_START),
            evening_end: hm(DEFAULT_EVENING_END),
        }
    }
}

impl ShiftWindows {
    pub fn bounds(&self, kind: CheckinKind) -> (NaiveTime, NaiveTime) {
        match kind {
            CheckinKind::Morning => (self.morning_start, self.morning_end),
            CheckinKind::Evening => (self.evening_start, self.evening_end),
        }
    }

    pub fn contains(&self, kind: CheckinKind, now: NaiveTime) -> bool {
        let (start, end) = self.bounds(kind);
        start <= now && now <= end
    }

    /// Window `now` falls into. Morning wins when windows overlap.
    pub fn active(&self, now: NaiveTime) -> Option<CheckinKind> {
        [CheckinKind::Morning, CheckinKind::Evening]
            .into_iter()
            .find(|kind| self.contains(*kind, now))
    }
}

fn hm((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Settings row. `chat_id == None` is the global default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSettings {
    pub id: i32,
    pub chat_id: Option<i32>,
    pub windows: ShiftWindows,
    pub alerts_enabled: bool,
    pub include_weekends: bool,
    pub timezone: String,
}

impl ShiftSettings {
    /// Saturday and Sunday are days off unless weekends are included.
    pub fn is_day_off(&self, date: NaiveDate) -> bool {
        !self.include_weekends && is_weekend(date)
    }

    pub fn is_global(&self) -> bool {
        self.chat_id.is_none()
    }
}

/// Settings row about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewShiftSettings {
    pub chat_id: Option<i32>,
    pub windows: ShiftWindows,
    pub alerts_enabled: bool,
    pub include_weekends: bool,
    pub timezone: String,
}

impl NewShiftSettings {
    /// Default windows, alerts on, weekends included.
    pub fn defaults(chat_id: Option<i32>, timezone: impl Into<String>) -> Self {
        Self {
            chat_id,
            windows: ShiftWindows::default(),
            alerts_enabled: true,
            include_weekends: true,
            timezone: timezone.into(),
        }
    }
}

/// Toggleable boolean settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsToggle {
    Alerts,
    Weekends,
}

impl SettingsToggle {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "alerts" => Some(SettingsToggle::Alerts),
            "weekend" => Some(SettingsToggle::Weekends),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SettingsToggle::Alerts => "alerts",
            SettingsToggle::Weekends => "weekend",
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Check a time against the given settings, or the default windows when the
/// chat has no settings row.
pub fn is_within_window(settings: Option<&ShiftSettings>, now: NaiveTime, kind: CheckinKind) -> bool {
    settings
        .map(|s| s.windows)
        .unwrap_or_default()
        .contains(kind, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn custom() -> ShiftSettings {
        ShiftSettings {
            id: 1,
            chat_id: Some(1),
            windows: ShiftWindows {
                morning_start: t(7, 0),
                morning_end: t(9, 0),
                evening_start: t(18, 0),
                evening_end: t(21, 0),
            },
            alerts_enabled: true,
            include_weekends: false,
            timezone: "Europe/Sofia".to_string(),
        }
    }

    #[test]
    fn test_window_detection_defaults() {
        assert!(is_within_window(None, t(6, 30), CheckinKind::Morning));
        assert!(!is_within_window(None, t(5, 59), CheckinKind::Morning));
        assert!(is_within_window(None, t(17, 0), CheckinKind::Evening));
        assert!(!is_within_window(None, t(17, 0), CheckinKind::Morning));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        assert!(is_within_window(None, t(6, 0), CheckinKind::Morning));
        assert!(is_within_window(None, t(11, 0), CheckinKind::Morning));
        assert!(is_within_window(None, t(23, 0), CheckinKind::Evening));
        assert!(!is_within_window(None, t(23, 1), CheckinKind::Evening));
    }

    #[test]
    fn test_window_detection_custom() {
        let settings = custom();
        assert!(is_within_window(Some(&settings), t(7, 30), CheckinKind::Morning));
        assert!(!is_within_window(Some(&settings), t(6, 59), CheckinKind::Morning));
        assert!(!is_within_window(Some(&settings), t(17, 0), CheckinKind::Evening));
    }

    #[test]
    fn test_active_window() {
        let windows = ShiftWindows::default();
        assert_eq!(windows.active(t(8, 0)), Some(CheckinKind::Morning));
        assert_eq!(windows.active(t(20, 0)), Some(CheckinKind::Evening));
        assert_eq!(windows.active(t(13, 0)), None);
    }

    #[test]
    fn test_day_off() {
        let settings = custom();
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert!(settings.is_day_off(saturday));
        assert!(!settings.is_day_off(monday));

        let mut with_weekends = settings;
        with_weekends.include_weekends = true;
        assert!(!with_weekends.is_day_off(saturday));
    }

    #[test]
    fn test_toggle_keys() {
        assert_eq!(SettingsToggle::from_key("alerts"), Some(SettingsToggle::Alerts));
        assert_eq!(SettingsToggle::from_key("weekend"), Some(SettingsToggle::Weekends));
        assert_eq!(SettingsToggle::from_key("tz"), None);
    }
}
