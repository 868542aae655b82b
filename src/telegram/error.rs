//! Bot API transport errors.

use thiserror::Error;

/// Failures talking to the Telegram Bot API
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Flood control; retry after the given number of seconds
    #[error("Flood control exceeded, retry after {0}s")]
    RetryAfter(u64),

    /// The bot was blocked by the user or removed from the chat
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },
}

pub type TelegramResult<T> = Result<T, TelegramError>;
