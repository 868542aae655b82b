//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use chrono_tz::Tz;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_HEALTH_HOST, DEFAULT_HEALTH_PORT, DEFAULT_INVITE_CODE,
    DEFAULT_LOG_LEVEL, DEFAULT_REDIS_URL, DEFAULT_SCHEDULER_TIMEZONE, DEFAULT_TELEGRAM_API_URL,
    DEFAULT_TIMEZONE, DEV_PHONE_SALT,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    bot_token: Option<String>,
    phone_salt: String,
    invite_code: String,
    pub database_url: String,
    pub redis_url: String,
    pub owner_telegram_id: Option<i64>,
    pub timezone: Tz,
    pub scheduler_timezone: Tz,
    pub log_level: String,
    pub health_host: String,
    pub health_port: u16,
    pub telegram_api_url: String,
    pub chart_font_path: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"[REDACTED]")
            .field("phone_salt", &"[REDACTED]")
            .field("invite_code", &"[REDACTED]")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("owner_telegram_id", &self.owner_telegram_id)
            .field("timezone", &self.timezone.name())
            .field("scheduler_timezone", &self.scheduler_timezone.name())
            .field("log_level", &self.log_level)
            .field("health_host", &self.health_host)
            .field("health_port", &self.health_port)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("chart_font_path", &self.chart_font_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            phone_salt: DEV_PHONE_SALT.to_string(),
            invite_code: DEFAULT_INVITE_CODE.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            owner_telegram_id: None,
            timezone: Tz::Europe__Sofia,
            scheduler_timezone: Tz::UTC,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            health_host: DEFAULT_HEALTH_HOST.to_string(),
            health_port: DEFAULT_HEALTH_PORT,
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            chart_font_path: None,
        }
    }
}

impl Config {
    /// Load configuration from `.env` and environment variables.
    ///
    /// `BOT_TOKEN` is only checked when the bot actually starts, so
    /// maintenance commands (`migrate`, `seed`) work without it.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let phone_salt = match env::var("PHONE_SALT") {
            Ok(salt) if !salt.is_empty() => salt,
            _ if cfg!(debug_assertions) => {
                tracing::warn!("PHONE_SALT not set, using insecure default for development");
                DEV_PHONE_SALT.to_string()
            }
            _ => {
                return Err(AppError::config(
                    "PHONE_SALT environment variable must be set in production",
                ))
            }
        };

        let owner_telegram_id = match env::var("OWNER_TELEGRAM_ID") {
            Ok(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                AppError::config(format!("OWNER_TELEGRAM_ID is not a number: {}", raw))
            })?),
            Err(_) => None,
        };

        let health_port = match env::var("HEALTH_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AppError::config(format!("HEALTH_PORT is not a port: {}", raw)))?,
            Err(_) => DEFAULT_HEALTH_PORT,
        };

        Ok(Self {
            bot_token: env::var("BOT_TOKEN").ok().filter(|t| !t.is_empty()),
            phone_salt,
            invite_code: env::var("INVITE_CODE")
                .unwrap_or_else(|_| DEFAULT_INVITE_CODE.to_string()),
            database_url: normalize_database_url(
                &env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            ),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            owner_telegram_id,
            timezone: parse_timezone(
                &env::var("TZ").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string()),
            )?,
            scheduler_timezone: parse_timezone(
                &env::var("SCHEDULER_TZ")
                    .unwrap_or_else(|_| DEFAULT_SCHEDULER_TIMEZONE.to_string()),
            )?,
            log_level: env::var("LOG_LEVEL")
                .map(|level| level.to_lowercase())
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            health_host: env::var("HEALTH_HOST")
                .unwrap_or_else(|_| DEFAULT_HEALTH_HOST.to_string()),
            health_port,
            telegram_api_url: env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.to_string()),
            chart_font_path: env::var("CHART_FONT_PATH").ok().filter(|p| !p.is_empty()),
        })
    }

    /// Override the bot token (tests and embedding).
    pub fn with_bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Some(token.into());
        self
    }

    /// Override the phone salt.
    pub fn with_phone_salt(mut self, salt: impl Into<String>) -> Self {
        self.phone_salt = salt.into();
        self
    }

    /// Override the invite code.
    pub fn with_invite_code(mut self, code: impl Into<String>) -> Self {
        self.invite_code = code.into();
        self
    }

    /// Bot token, required to talk to Telegram.
    pub fn bot_token(&self) -> AppResult<&str> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| AppError::config("BOT_TOKEN environment variable must be set"))
    }

    pub fn phone_salt(&self) -> &str {
        &self.phone_salt
    }

    /// Check a user-supplied invite code.
    pub fn invite_code_matches(&self, code: &str) -> bool {
        code.trim() == self.invite_code
    }

    /// Check whether a Telegram user is the configured owner.
    pub fn is_owner(&self, telegram_id: i64) -> bool {
        self.owner_telegram_id == Some(telegram_id)
    }

    /// Get the full health endpoint address.
    pub fn health_addr(&self) -> String {
        format!("{}:{}", self.health_host, self.health_port)
    }
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    Tz::from_str(name.trim()).map_err(|_| AppError::config(format!("Unknown timezone: {}", name)))
}

/// Accept SQLAlchemy-style driver suffixes left over in old `.env` files.
fn normalize_database_url(url: &str) -> String {
    url.replacen("postgresql+asyncpg://", "postgres://", 1)
        .replacen("sqlite+aiosqlite://", "sqlite://", 1)
}
