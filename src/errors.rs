//! Centralized error handling.
//!
//! Provides a unified error type for the entire application. Handlers
//! return it to the dispatcher, which logs it and keeps polling.

use thiserror::Error;

use crate::telegram::TelegramError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // External service errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Cache(_) => "CACHE_ERROR",
            AppError::Telegram(_) => "TELEGRAM_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound => "Не найдено".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Conflict(msg) => format!("{} уже существует", msg),
            _ => "Произошла ошибка, попробуйте позже".to_string(),
        }
    }

    /// Whether the error is caused by the user rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::NotFound
                | AppError::Conflict(_)
                | AppError::Validation(_)
        )
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// Check whether a database error is a unique constraint violation.
pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = AppError::internal("connection pool exhausted");
        assert!(!err.user_message().contains("pool"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_client_errors() {
        assert!(AppError::validation("Неверная роль").is_client_error());
        assert_eq!(AppError::validation("Неверная роль").user_message(), "Неверная роль");
        assert_eq!(AppError::NotFound.code(), "NOT_FOUND");
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<i32> = None;
        assert!(matches!(missing.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(3).ok_or_not_found().unwrap(), 3);
    }
}
