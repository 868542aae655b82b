//! Phone hashing and deep-link payloads.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::domain::PhoneVerification;

/// Salted SHA-256 of a phone number plus its last four characters.
pub fn hash_phone(salt: &str, phone: &str) -> PhoneVerification {
    let digest = Sha256::digest(format!("{}:{}", salt, phone).as_bytes());
    let chars: Vec<char> = phone.chars().collect();
    let last4: String = chars[chars.len().saturating_sub(4)..].iter().collect();

    PhoneVerification {
        sha256: hex::encode(digest),
        last4,
    }
}

/// URL-safe base64 of the decimal chat id, used as the `/start` payload.
pub fn encode_chat_payload(chat_id: i64) -> String {
    URL_SAFE.encode(chat_id.to_string())
}

/// Inverse of [`encode_chat_payload`]. Anything malformed yields `None`.
pub fn decode_chat_payload(payload: &str) -> Option<i64> {
    let bytes = URL_SAFE.decode(payload.trim()).ok()?;
    String::from_utf8(bytes).ok()?.parse().ok()
}

/// `https://t.me/<bot>?start=<payload>` for a group chat.
pub fn deep_link(bot_username: &str, chat_id: i64) -> String {
    format!(
        "https://t.me/{}?start={}",
        bot_username,
        encode_chat_payload(chat_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_hash_is_salted_and_deterministic() {
        let first = hash_phone("salt", "+359888123456");
        let second = hash_phone("salt", "+359888123456");
        let other_salt = hash_phone("pepper", "+359888123456");

        assert_eq!(first, second);
        assert_ne!(first.sha256, other_salt.sha256);
        assert_eq!(first.sha256.len(), 64);
        assert_eq!(first.last4, "3456");
    }

    #[test]
    fn test_short_phone_keeps_everything() {
        assert_eq!(hash_phone("s", "12").last4, "12");
    }

    #[test]
    fn test_payload_round_trip_for_group_ids() {
        for chat_id in [12345_i64, -1001234567890, -42] {
            let payload = encode_chat_payload(chat_id);
            assert_eq!(decode_chat_payload(&payload), Some(chat_id));
        }
    }

    #[test]
    fn test_payload_is_padded_urlsafe_base64() {
        assert_eq!(encode_chat_payload(12345), "MTIzNDU=");
    }

    #[test]
    fn test_invalid_payload_has_no_target() {
        assert_eq!(decode_chat_payload("not base64!"), None);
        assert_eq!(decode_chat_payload(&URL_SAFE.encode("abc")), None);
    }

    #[test]
    fn test_deep_link() {
        assert_eq!(
            deep_link("shift_bot", 12345),
            "https://t.me/shift_bot?start=MTIzNDU="
        );
    }
}
