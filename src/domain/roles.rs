//! Enumerations stored as strings in the database.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Membership role inside a team chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Operator,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Operator => "OPERATOR",
            Role::Manager => "MANAGER",
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Manager)
    }
}

impl FromStr for Role {
    type Err = AppError;

    /// Case-insensitive, so `/setrole 42 manager` works.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPERATOR" => Ok(Role::Operator),
            "MANAGER" => Ok(Role::Manager),
            _ => Err(AppError::validation("Неизвестная роль")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a membership was authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthMethod {
    Phone,
    Captcha,
    Invite,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Phone => "PHONE",
            AuthMethod::Captcha => "CAPTCHA",
            AuthMethod::Invite => "INVITE",
        }
    }
}

impl FromStr for AuthMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PHONE" => Ok(AuthMethod::Phone),
            "CAPTCHA" => Ok(AuthMethod::Captcha),
            "INVITE" => Ok(AuthMethod::Invite),
            other => Err(AppError::internal(format!("Unknown auth method: {}", other))),
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shift check-in kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckinKind {
    Morning,
    Evening,
}

impl CheckinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckinKind::Morning => "MORNING",
            CheckinKind::Evening => "EVENING",
        }
    }

    /// Russian name of the window used in reminders
    pub fn window_label(&self) -> &'static str {
        match self {
            CheckinKind::Morning => "утро",
            CheckinKind::Evening => "вечер",
        }
    }
}

impl FromStr for CheckinKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MORNING" => Ok(CheckinKind::Morning),
            "EVENING" => Ok(CheckinKind::Evening),
            other => Err(AppError::validation(format!("Unknown check-in type: {}", other))),
        }
    }
}

impl fmt::Display for CheckinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!("OPERATOR".parse::<Role>().unwrap(), Role::Operator);
        assert!("boss".parse::<Role>().is_err());
    }

    #[test]
    fn test_checkin_kind_round_trip() {
        for kind in [CheckinKind::Morning, CheckinKind::Evening] {
            assert_eq!(kind.as_str().parse::<CheckinKind>().unwrap(), kind);
        }
        assert_eq!(CheckinKind::Evening.window_label(), "вечер");
    }
}
