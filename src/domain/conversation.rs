//! Per-user conversation state for multi-step private chat flows.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{CACHE_PREFIX_STATE, PHOTO_MAX_AGE_SECONDS};

/// Where a user is in a flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Idle,
    AwaitingMethod,
    AwaitingContact,
    AwaitingCaptcha,
    AwaitingInvite,
    AwaitingConfirmation,
}

/// Photo waiting for a check-in confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPhoto {
    pub file_id: String,
    pub file_unique_id: String,
    pub received_at: DateTime<Utc>,
}

impl PendingPhoto {
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.received_at > Duration::seconds(PHOTO_MAX_AGE_SECONDS)
    }
}

/// Conversation stored per (chat, user)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub step: Step,
    /// Telegram id of the group the user authorizes for
    pub target_chat_id: Option<i64>,
    pub captcha_answer: Option<i32>,
    pub pending_photo: Option<PendingPhoto>,
}

impl Conversation {
    pub fn is_empty(&self) -> bool {
        *self == Conversation::default()
    }
}

/// Storage key of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub chat_id: i64,
    pub user_id: i64,
}

impl ConversationKey {
    pub fn new(chat_id: i64, user_id: i64) -> Self {
        Self { chat_id, user_id }
    }

    pub fn cache_key(&self) -> String {
        format!("{}{}:{}", CACHE_PREFIX_STATE, self.chat_id, self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_photo_expires_after_two_minutes() {
        let received_at = Utc::now();
        let photo = PendingPhoto {
            file_id: "f".to_string(),
            file_unique_id: "u".to_string(),
            received_at,
        };
        assert!(!photo.is_stale(received_at + Duration::seconds(120)));
        assert!(photo.is_stale(received_at + Duration::seconds(121)));
    }

    #[test]
    fn test_conversation_key() {
        assert_eq!(ConversationKey::new(5, 7).cache_key(), "fsm:5:7");
        assert!(Conversation::default().is_empty());
    }
}
