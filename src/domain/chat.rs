//! Team chat and membership entities.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::roles::{AuthMethod, Role};
use crate::config::parse_timezone;
use crate::errors::AppResult;

/// Telegram group registered with the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i32,
    /// Telegram chat id (negative for groups)
    pub chat_id: i64,
    pub title: Option<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Title, or the Telegram id when the chat has none.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => self.chat_id.to_string(),
        }
    }

    pub fn tz(&self) -> AppResult<Tz> {
        parse_timezone(&self.timezone)
    }
}

/// User's role in a chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: i32,
    pub user_id: i32,
    pub chat_id: i32,
    pub role: Role,
    pub authorized: bool,
    pub authorized_via: Option<AuthMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn is_authorized_operator(&self) -> bool {
        self.authorized && self.role == Role::Operator
    }
}
