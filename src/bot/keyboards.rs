//! Inline and reply keyboards with their callback data.

use crate::domain::{CheckinKind, ReportPeriod, SettingsToggle, ShiftSettings};
use crate::telegram::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup,
    ReplyKeyboardRemove, ReplyMarkup,
};
use crate::utils::deep_link;

use super::texts;

pub const AUTH_PHONE: &str = "auth:phone";
pub const AUTH_CAPTCHA: &str = "auth:captcha";
pub const AUTH_INVITE: &str = "auth:invite";
pub const CAPTCHA_ANSWER_PREFIX: &str = "auth:capture:";
pub const CHECKIN_CONFIRM_PREFIX: &str = "checkin:confirm:";
pub const REPORT_PERIOD_PREFIX: &str = "report:period:";
pub const SETTINGS_TOGGLE_PREFIX: &str = "settings:toggle:";

fn rows(buttons: Vec<InlineKeyboardButton>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: buttons.into_iter().map(|b| vec![b]).collect(),
    }
}

pub fn authorize_link(bot_username: &str, chat_id: i64) -> InlineKeyboardMarkup {
    rows(vec![InlineKeyboardButton::url(
        texts::AUTHORIZE_BUTTON,
        deep_link(bot_username, chat_id),
    )])
}

pub fn auth_methods() -> InlineKeyboardMarkup {
    rows(vec![
        InlineKeyboardButton::callback(texts::AUTH_PHONE_BUTTON, AUTH_PHONE),
        InlineKeyboardButton::callback(texts::AUTH_CAPTCHA_BUTTON, AUTH_CAPTCHA),
        InlineKeyboardButton::callback(texts::AUTH_INVITE_BUTTON, AUTH_INVITE),
    ])
}

pub fn share_phone() -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup {
        keyboard: vec![vec![KeyboardButton {
            text: texts::SHARE_PHONE_BUTTON.to_string(),
            request_contact: true,
        }]],
        resize_keyboard: true,
        one_time_keyboard: true,
    }
}

pub fn remove_keyboard() -> ReplyMarkup {
    ReplyMarkup::Remove(ReplyKeyboardRemove {
        remove_keyboard: true,
    })
}

/// One row with every option.
pub fn captcha(options: &[i32]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![options
            .iter()
            .map(|value| {
                InlineKeyboardButton::callback(
                    value.to_string(),
                    format!("{}{}", CAPTCHA_ANSWER_PREFIX, value),
                )
            })
            .collect()],
    }
}

pub fn checkin_choice() -> InlineKeyboardMarkup {
    let confirm = |kind: CheckinKind| format!("{}{}", CHECKIN_CONFIRM_PREFIX, kind.as_str());
    rows(vec![
        InlineKeyboardButton::callback(texts::MORNING_BUTTON, confirm(CheckinKind::Morning)),
        InlineKeyboardButton::callback(texts::EVENING_BUTTON, confirm(CheckinKind::Evening)),
    ])
}

pub fn report_periods() -> InlineKeyboardMarkup {
    rows(
        ReportPeriod::ALL
            .iter()
            .map(|period| {
                InlineKeyboardButton::callback(
                    period.label(),
                    format!("{}{}", REPORT_PERIOD_PREFIX, period.key()),
                )
            })
            .collect(),
    )
}

pub fn settings(settings: &ShiftSettings) -> InlineKeyboardMarkup {
    let toggle = |t: SettingsToggle| format!("{}{}", SETTINGS_TOGGLE_PREFIX, t.key());
    rows(vec![
        InlineKeyboardButton::callback(
            format!(
                "Алерты: {}",
                if settings.alerts_enabled { "Вкл" } else { "Выкл" }
            ),
            toggle(SettingsToggle::Alerts),
        ),
        InlineKeyboardButton::callback(
            format!(
                "Выходные: {}",
                if settings.include_weekends { "Да" } else { "Нет" }
            ),
            toggle(SettingsToggle::Weekends),
        ),
    ])
}
