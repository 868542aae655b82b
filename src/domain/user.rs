//! Telegram user entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_LOCALE, SUPPORTED_LOCALES};

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub phone_last4: Option<String>,
    #[serde(skip_serializing)]
    pub phone_sha256: Option<String>,
    pub phone_verified_at: Option<DateTime<Utc>>,
    pub dm_blocked: bool,
    pub locale: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name used in group reminders: `@username`, then full name, then the id.
    pub fn mention(&self) -> String {
        match (&self.username, &self.full_name) {
            (Some(username), _) if !username.is_empty() => format!("@{}", username),
            (_, Some(full_name)) if !full_name.is_empty() => full_name.clone(),
            _ => self.telegram_id.to_string(),
        }
    }

    /// Name used in CSV exports: full name, then username, then the id.
    pub fn export_name(&self) -> String {
        match (&self.full_name, &self.username) {
            (Some(full_name), _) if !full_name.is_empty() => full_name.clone(),
            (_, Some(username)) if !username.is_empty() => username.clone(),
            _ => self.telegram_id.to_string(),
        }
    }

    pub fn locale(&self) -> &str {
        self.locale.as_deref().unwrap_or(DEFAULT_LOCALE)
    }

    /// Next locale in the ru ⇄ en cycle.
    pub fn toggled_locale(&self) -> &'static str {
        let current = self.locale();
        let index = SUPPORTED_LOCALES
            .iter()
            .position(|locale| *locale == current)
            .unwrap_or(0);
        SUPPORTED_LOCALES[(index + 1) % SUPPORTED_LOCALES.len()]
    }

    pub fn is_phone_verified(&self) -> bool {
        self.phone_verified_at.is_some()
    }
}

/// Profile fields copied from Telegram on every authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
}

/// Salted phone digest plus the last digits shown to managers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneVerification {
    pub sha256: String,
    pub last4: String,
}
