//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use shift_bot::infra::{Database, Persistence};
use shift_bot::telegram::types::{
    ChatMember, InlineKeyboardMarkup, InputFile, ReplyMarkup, Update, User,
};
use shift_bot::telegram::{BotApi, TelegramResult};

/// Fresh in-memory SQLite database with the real migrations applied.
pub async fn migrated_database() -> Database {
    let db = Database::connect_url("sqlite::memory:")
        .await
        .expect("sqlite connection");
    db.run_migrations().await.expect("migrations");
    db
}

pub fn persistence(db: &Database) -> Arc<Persistence> {
    Arc::new(Persistence::new(db.get_connection()))
}

/// Outgoing call captured by `RecordingBot`
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message {
        chat_id: i64,
        text: String,
        markup: Option<ReplyMarkup>,
    },
    Photo {
        chat_id: i64,
        file_name: String,
    },
    Document {
        chat_id: i64,
        file_name: String,
    },
    Answer {
        text: Option<String>,
        alert: bool,
    },
    MarkupEdit {
        chat_id: i64,
        message_id: i64,
    },
}

/// Bot API fake that records every call and always succeeds.
#[derive(Default)]
pub struct RecordingBot {
    pub sent: Mutex<Vec<Sent>>,
    /// Status returned by getChatMember
    pub member_status: Mutex<String>,
    /// Handed out by the next getUpdates call
    pub queued: Mutex<Vec<Update>>,
    pub delivered: AtomicBool,
    /// Latency of sendMessage
    pub reply_delay: Mutex<Option<Duration>>,
}

impl RecordingBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            member_status: Mutex::new("member".to_string()),
            ..Default::default()
        })
    }

    pub fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|sent| match sent {
                Sent::Message { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_answer(&self) -> Option<(Option<String>, bool)> {
        self.sent.lock().unwrap().iter().rev().find_map(|sent| match sent {
            Sent::Answer { text, alert } => Some((text.clone(), *alert)),
            _ => None,
        })
    }

    pub fn queue_updates(&self, updates: Vec<Update>) {
        self.queued.lock().unwrap().extend(updates);
    }

    pub fn updates_delivered(&self) -> bool {
        self.delivered.load(Ordering::SeqCst)
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl BotApi for RecordingBot {
    async fn get_me(&self) -> TelegramResult<User> {
        Ok(bot_user())
    }

    async fn get_updates(&self, _offset: i64, _timeout: u64) -> TelegramResult<Vec<Update>> {
        let updates = std::mem::take(&mut *self.queued.lock().unwrap());
        if updates.is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        } else {
            self.delivered.store(true, Ordering::SeqCst);
        }
        Ok(updates)
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: String,
        markup: Option<ReplyMarkup>,
    ) -> TelegramResult<()> {
        let delay = *self.reply_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.record(Sent::Message {
            chat_id,
            text,
            markup,
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: InputFile,
        _caption: Option<String>,
    ) -> TelegramResult<()> {
        self.record(Sent::Photo {
            chat_id,
            file_name: photo.file_name,
        });
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        document: InputFile,
        _caption: Option<String>,
    ) -> TelegramResult<()> {
        self.record(Sent::Document {
            chat_id,
            file_name: document.file_name,
        });
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        _callback_query_id: String,
        text: Option<String>,
        show_alert: bool,
    ) -> TelegramResult<()> {
        self.record(Sent::Answer {
            text,
            alert: show_alert,
        });
        Ok(())
    }

    async fn edit_message_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        _markup: InlineKeyboardMarkup,
    ) -> TelegramResult<()> {
        self.record(Sent::MarkupEdit {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn get_chat_member(&self, _chat_id: i64, user_id: i64) -> TelegramResult<ChatMember> {
        Ok(ChatMember {
            status: self.member_status.lock().unwrap().clone(),
            user: person(user_id, "member"),
        })
    }
}

pub const BOT_USERNAME: &str = "shift_bot";

pub fn bot_user() -> User {
    User {
        id: 999,
        is_bot: true,
        first_name: "Shift".to_string(),
        last_name: None,
        username: Some(BOT_USERNAME.to_string()),
    }
}

pub fn person(id: i64, username: &str) -> User {
    User {
        id,
        is_bot: false,
        first_name: "Ivan".to_string(),
        last_name: None,
        username: Some(username.to_string()),
    }
}
