//! Telegram Bot API transport.
//!
//! A thin JSON/multipart client behind the `BotApi` trait, so handlers and
//! jobs can be exercised against a fake.

mod client;
mod error;
pub mod types;

pub use client::{BotApi, HttpBotApi};
pub use error::{TelegramError, TelegramResult};

#[cfg(any(test, feature = "test-utils"))]
pub use client::MockBotApi;
