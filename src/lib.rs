//! Shift Bot - photo-confirmed shift check-ins for Telegram teams
//!
//! Operators confirm the start and end of their shift with a photo sent to
//! the bot in private chat. Group chats are teams; managers read attendance
//! reports and tune per-chat settings. Reminders go out every few minutes and
//! daily statistics are rolled up every night.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Application use cases
//! - **infra**: Database, Redis and conversation state
//! - **telegram**: Bot API client
//! - **bot**: Update routing and handlers
//! - **jobs**: Reminder and aggregation jobs
//! - **api**: Health endpoint
//! - **utils**: Hashing, time, CSV and chart helpers
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the bot
//! shift-bot run
//!
//! # Run migrations
//! shift-bot migrate up
//!
//! # Demo data
//! shift-bot seed
//! ```

pub mod api;
pub mod bot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod telegram;
pub mod utils;

// Re-export commonly used types at crate root
pub use config::Config;
pub use errors::{AppError, AppResult};
