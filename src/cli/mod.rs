//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `run` - Start the bot
//! - `migrate` - Database migrations
//! - `seed` - Demo data
//! - `jobs` - One-off scheduled job runs

pub mod args;

pub use args::{Cli, Commands};
