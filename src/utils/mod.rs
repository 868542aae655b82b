//! Utility functions and helpers.

pub mod chart;
pub mod export;
pub mod security;
pub mod time;

pub use chart::ChartRenderer;
pub use export::{checkins_csv, stats_csv, ExportRow};
pub use security::{decode_chat_payload, deep_link, encode_chat_payload, hash_phone};
pub use time::{local_now, yesterday_in};
