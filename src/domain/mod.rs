//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns:
//! users, team chats, memberships, check-ins, shift windows and
//! daily statistics.

pub mod chat;
pub mod checkin;
pub mod conversation;
pub mod roles;
pub mod schedule;
pub mod stats;
pub mod user;

pub use chat::{Chat, Membership};
pub use checkin::{Checkin, NewCheckin};
pub use conversation::{Conversation, ConversationKey, PendingPhoto, Step};
pub use roles::{AuthMethod, CheckinKind, Role};
pub use schedule::{
    is_weekend, is_within_window, NewShiftSettings, SettingsToggle, ShiftSettings, ShiftWindows,
};
pub use stats::{sum_by_date, AttendancePoint, DailyAggregate, DailyStat, Misses, ReportPeriod};
pub use user::{PhoneVerification, User, UserProfile};
