//! Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::error::{TelegramError, TelegramResult};
use super::types::{
    ApiResponse, ChatMember, InlineKeyboardMarkup, InputFile, ReplyMarkup, Update, User,
};
use crate::config::{ALLOWED_UPDATES, POLL_TIMEOUT_SECONDS};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Bot API operations used by handlers, jobs and the polling loop.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Identity of the bot itself
    async fn get_me(&self) -> TelegramResult<User>;

    /// Long poll for updates after `offset`
    async fn get_updates(&self, offset: i64, timeout: u64) -> TelegramResult<Vec<Update>>;

    async fn send_message(
        &self,
        chat_id: i64,
        text: String,
        markup: Option<ReplyMarkup>,
    ) -> TelegramResult<()>;

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: InputFile,
        caption: Option<String>,
    ) -> TelegramResult<()>;

    async fn send_document(
        &self,
        chat_id: i64,
        document: InputFile,
        caption: Option<String>,
    ) -> TelegramResult<()>;

    async fn answer_callback_query(
        &self,
        callback_query_id: String,
        text: Option<String>,
        show_alert: bool,
    ) -> TelegramResult<()>;

    async fn edit_message_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        markup: InlineKeyboardMarkup,
    ) -> TelegramResult<()>;

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> TelegramResult<ChatMember>;
}

/// reqwest-based Bot API client
pub struct HttpBotApi {
    client: Client,
    base_url: String,
}

impl HttpBotApi {
    /// Build a client for `{api_url}/bot{token}`.
    ///
    /// The request timeout exceeds the long-polling timeout so `getUpdates`
    /// is never cut short by the client.
    pub fn new(api_url: &str, token: &str) -> TelegramResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECONDS + 15))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> TelegramResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await?;
        let status = response.status().as_u16();
        let envelope: ApiResponse<R> = response.json().await?;
        into_result(status, envelope)
    }

    async fn upload(
        &self,
        method: &str,
        field: &str,
        chat_id: i64,
        file: InputFile,
        caption: Option<String>,
    ) -> TelegramResult<()> {
        let mut form = Form::new().text("chat_id", chat_id.to_string()).part(
            field.to_string(),
            Part::bytes(file.bytes).file_name(file.file_name),
        );
        if let Some(caption) = caption {
            form = form.text("caption", caption);
        }

        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        let envelope: ApiResponse<serde_json::Value> = response.json().await?;
        into_result(status, envelope).map(|_| ())
    }
}

/// Map a Bot API envelope to a result.
///
/// 429 becomes `RetryAfter`, 403 becomes `Forbidden`, anything else that is
/// not ok becomes `Api`.
pub(crate) fn into_result<R>(status: u16, envelope: ApiResponse<R>) -> TelegramResult<R> {
    let code = envelope.error_code.unwrap_or(i64::from(status));
    let description = envelope.description.unwrap_or_default();

    if envelope.ok {
        return envelope.result.ok_or(TelegramError::Api {
            code,
            description: "response without result".to_string(),
        });
    }

    match code {
        429 => Err(TelegramError::RetryAfter(
            envelope
                .parameters
                .and_then(|p| p.retry_after)
                .unwrap_or(1),
        )),
        403 => Err(TelegramError::Forbidden(description)),
        _ => Err(TelegramError::Api { code, description }),
    }
}

#[async_trait]
impl BotApi for HttpBotApi {
    async fn get_me(&self) -> TelegramResult<User> {
        self.call("getMe", &json!({})).await
    }

    async fn get_updates(&self, offset: i64, timeout: u64) -> TelegramResult<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout,
                "allowed_updates": ALLOWED_UPDATES,
            }),
        )
        .await
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: String,
        markup: Option<ReplyMarkup>,
    ) -> TelegramResult<()> {
        let mut params = json!({ "chat_id": chat_id, "text": text });
        if let Some(markup) = markup {
            params["reply_markup"] = json!(markup);
        }
        self.call::<_, serde_json::Value>("sendMessage", &params)
            .await
            .map(|_| ())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: InputFile,
        caption: Option<String>,
    ) -> TelegramResult<()> {
        self.upload("sendPhoto", "photo", chat_id, photo, caption).await
    }

    async fn send_document(
        &self,
        chat_id: i64,
        document: InputFile,
        caption: Option<String>,
    ) -> TelegramResult<()> {
        self.upload("sendDocument", "document", chat_id, document, caption)
            .await
    }

    async fn answer_callback_query(
        &self,
        callback_query_id: String,
        text: Option<String>,
        show_alert: bool,
    ) -> TelegramResult<()> {
        let mut params = json!({
            "callback_query_id": callback_query_id,
            "show_alert": show_alert,
        });
        if let Some(text) = text {
            params["text"] = json!(text);
        }
        self.call::<_, bool>("answerCallbackQuery", &params)
            .await
            .map(|_| ())
    }

    async fn edit_message_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        markup: InlineKeyboardMarkup,
    ) -> TelegramResult<()> {
        self.call::<_, serde_json::Value>(
            "editMessageReplyMarkup",
            &json!({
                "chat_id": chat_id,
                "message_id": message_id,
                "reply_markup": markup,
            }),
        )
        .await
        .map(|_| ())
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> TelegramResult<ChatMember> {
        self.call(
            "getChatMember",
            &json!({ "chat_id": chat_id, "user_id": user_id }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ApiResponse<serde_json::Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_flood_control_maps_to_retry_after() {
        let result = into_result(
            429,
            envelope(
                r#"{"ok":false,"error_code":429,"description":"Too Many Requests","parameters":{"retry_after":7}}"#,
            ),
        );
        assert!(matches!(result, Err(TelegramError::RetryAfter(7))));
    }

    #[test]
    fn test_blocked_bot_maps_to_forbidden() {
        let result = into_result(
            403,
            envelope(r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#),
        );
        assert!(matches!(result, Err(TelegramError::Forbidden(d)) if d.contains("blocked")));
    }

    #[test]
    fn test_other_failures_map_to_api_error() {
        let result = into_result(
            400,
            envelope(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#),
        );
        assert!(matches!(result, Err(TelegramError::Api { code: 400, .. })));
    }

    #[test]
    fn test_ok_envelope_yields_result() {
        let result = into_result(200, envelope(r#"{"ok":true,"result":true}"#)).unwrap();
        assert_eq!(result, serde_json::Value::Bool(true));
    }

    #[test]
    fn test_method_url() {
        let api = HttpBotApi::new("https://api.telegram.org/", "123:abc").unwrap();
        assert_eq!(
            api.method_url("getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
    }
}
