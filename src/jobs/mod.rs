//! Background jobs.
//!
//! - `reminder_job`: nudge groups about missing check-ins (every 5 minutes)
//! - `aggregation_job`: roll check-ins into `daily_stats` (nightly, locked)
//! - `scheduler`: drives both until shutdown

mod aggregation_job;
mod reminder_job;
mod scheduler;

pub use aggregation_job::run_aggregation;
pub use reminder_job::run_reminders;
pub use scheduler::{next_run, parse_schedule, Scheduler};
