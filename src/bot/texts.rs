//! User-facing messages.

use crate::domain::{Chat, DailyStat, Membership, ShiftSettings};
use crate::services::Report;

pub const GROUP_GREETING: &str = "Привет! Чтобы участвовать в отчётах, нужно пройти авторизацию.\nНажмите кнопку ниже — откроется личный чат со мной.";
pub const AUTHORIZE_BUTTON: &str = "Авторизоваться";

pub const CHOOSE_AUTH_METHOD: &str = "Привет! Выберите способ авторизации.";
pub const AUTH_PHONE_BUTTON: &str = "📞 Поделиться телефоном";
pub const AUTH_CAPTCHA_BUTTON: &str = "🧮 Капча";
pub const AUTH_INVITE_BUTTON: &str = "🔑 Код приглашения";
pub const SEND_PHONE: &str = "Отправьте номер телефона";
pub const SHARE_PHONE_BUTTON: &str = "Поделиться телефоном";
pub const NO_TARGET_USE_LINK: &str = "Не удалось определить чат. Используйте /link в группе.";
pub const NO_TARGET: &str = "Не удалось определить чат";
pub const UNKNOWN_CHAT: &str = "Неизвестный чат";
pub const FOREIGN_CONTACT: &str = "Отправьте свой номер телефона";
pub const PHONE_AUTHORIZED: &str = "✅ Авторизация завершена";
pub const CAPTCHA_WRONG: &str = "Неверно";
pub const CAPTCHA_AUTHORIZED: &str = "✅ Авторизация через капчу выполнена";
pub const ENTER_INVITE: &str = "Введите код приглашения";
pub const INVITE_WRONG: &str = "Неверный код, попробуйте снова";
pub const INVITE_AUTHORIZED: &str = "✅ Авторизация выполнена";

pub const CHOOSE_CHECKIN: &str = "Выберите отметку";
pub const MORNING_BUTTON: &str = "Я пришёл на работу";
pub const EVENING_BUTTON: &str = "Смену завершил";
pub const SEND_FRESH_PHOTO: &str = "Отправьте актуальное фото";
pub const PHOTO_STALE: &str = "Фото устарело, отправьте новое";
pub const AUTHORIZE_FIRST: &str = "Сначала пройдите авторизацию";
pub const NO_CHECKINS_TODAY: &str = "Сегодня отметки не требуются";
pub const OUTSIDE_WINDOW: &str = "Сейчас отметка недоступна";
pub const ALREADY_CHECKED_IN: &str = "✅ Отметка уже зафиксирована";
pub const CHECKIN_SAVED: &str = "✅ Отметка сохранена";

pub const CHOOSE_PERIOD: &str = "Выберите период";
pub const DASHBOARD: &str = "Дашборд";
pub const NOT_AUTHORIZED: &str = "Нет авторизации";
pub const NO_DATA: &str = "Нет данных";
pub const NO_STATS: &str = "Нет статистики";
pub const NO_ACCESS: &str = "Нет доступа";
pub const EXPORT_CAPTION: &str = "Экспорт";

pub const MANAGER_ONLY: &str = "Только управляющий может изменять настройки";
pub const NOT_ENOUGH_RIGHTS: &str = "Недостаточно прав";
pub const UPDATED: &str = "Обновлено";

pub const HELP: &str = "Доступные команды:\n/help — справка\n/my — мои роли\n/report — отчёты\n/settings — настройки\n/setrole — управление ролями";
pub const HEALTH_OK: &str = "OK";
pub const AUTHORIZE_BEFORE_LANG: &str = "Сначала авторизуйтесь";
pub const NO_ROLES: &str = "Нет ролей";
pub const GROUP_ONLY: &str = "Команда доступна в группе";
pub const SETROLE_USAGE: &str = "Использование: /setrole <user_id|@username> <operator|manager>";
pub const UNKNOWN_ROLE: &str = "Неизвестная роль";
pub const BAD_IDENTIFIER: &str = "Неверный идентификатор";
pub const USER_NOT_FOUND: &str = "Пользователь не найден";
pub const USER_NOT_AUTHORIZED: &str = "Пользователь не авторизован";
pub const ROLE_UPDATED: &str = "Роль обновлена";

pub fn link(url: &str) -> String {
    format!("Откройте личный чат со мной по ссылке: {}", url)
}

pub fn captcha_question(a: i32, b: i32) -> String {
    format!("Сколько будет {}+{}?", a, b)
}

pub fn language_changed(locale: &str) -> String {
    format!("Язык изменён на {}", locale)
}

pub fn roles(entries: &[(Chat, Membership)]) -> String {
    entries
        .iter()
        .map(|(chat, membership)| {
            format!("Чат {}: роль {}", chat.display_title(), membership.role)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn report_caption(report: &Report) -> String {
    if report.summary {
        format!(
            "Сводный отчёт: {}\nПериод: {} — {}\nВсего операторов: {}",
            report.period.label(),
            report.from,
            report.to,
            report.operators
        )
    } else {
        format!(
            "Отчёт: {}\nПериод: {} — {}\nОператоров: {}",
            report.period.label(),
            report.from,
            report.to,
            report.operators
        )
    }
}

pub fn chats_overview(rows: &[(Chat, DailyStat)]) -> String {
    rows.iter()
        .map(|(chat, stat)| {
            format!(
                "Чат: {}, дата {}: утро {}, вечер {}",
                chat.display_title(),
                stat.date,
                stat.morning_cnt,
                stat.evening_cnt
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn settings(chat: &Chat, settings: &ShiftSettings) -> String {
    let w = &settings.windows;
    format!(
        "Настройки чата {}:\nУтро: {}-{}\nВечер: {}-{}\nТаймзона: {}\nАлерты: {}\nВыходные: {}",
        chat.display_title(),
        w.morning_start.format("%H:%M"),
        w.morning_end.format("%H:%M"),
        w.evening_start.format("%H:%M"),
        w.evening_end.format("%H:%M"),
        settings.timezone,
        if settings.alerts_enabled { "Вкл" } else { "Выкл" },
        if settings.include_weekends {
            "Учитывать"
        } else {
            "Игнорировать"
        },
    )
}
