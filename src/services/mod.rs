//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! the bot's use cases. They depend on abstractions (traits) for
//! dependency inversion and reach repositories through the Unit of Work.

mod auth_service;
mod checkin_service;
pub mod container;
mod membership_service;
mod notification_service;
mod reminder_service;
mod report_service;
mod settings_service;
mod stats_service;

#[cfg(test)]
mod test_support;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Captcha};
pub use checkin_service::{CheckinOutcome, CheckinRecorder, CheckinService};
pub use membership_service::{MembershipManager, MembershipService, RoleChange, RoleTarget};
pub use notification_service::{reminder_text, NotificationService, Notifier};
pub use reminder_service::{PendingReminder, ReminderPlanner, ReminderService};
pub use report_service::{Report, ReportOutcome, ReportService, Reporter};
pub use settings_service::{SettingsAccess, SettingsManager, SettingsService};
pub use stats_service::{Aggregator, StatsService};
