//! Telegram Bot API client with rate limiting and retries
//!
//! Implements [`ChatPlatform`] over HTTPS. Every call waits for the
//! outbound limiter, then retries transient failures with exponential
//! backoff. Client errors are returned at once.

use crate::api::{
    ApiResponse, BotCommand, ChatPermissions, InlineKeyboardMarkup, Message, RawChatMember,
    Update, User, ALLOWED_UPDATES,
};
use crate::error::{BotError, BotResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, instrument, warn};
use url::Url;
use woxl_common::{ChatId, MessageId, UserId};
use woxl_config::TelegramConfig;
use woxl_moderation::{
    ChatMember, ChatPlatform, InlineKeyboard, MemberPermissions, PlatformError, PlatformResult,
    UserProfile,
};

const NOT_MODIFIED: &str = "message is not modified";

/// Methods that post visible content; repeating one after delivery duplicates it
const NON_IDEMPOTENT: [&str; 2] = ["sendMessage", "editMessageText"];

fn should_retry(method: &str, error: &PlatformError) -> bool {
    if NON_IDEMPOTENT.contains(&method) {
        error.is_unsent()
    } else {
        error.is_transient()
    }
}

fn transport_error(e: &reqwest::Error) -> PlatformError {
    if e.is_connect() {
        PlatformError::Connect(e.to_string())
    } else {
        PlatformError::Transport(e.to_string())
    }
}

/// Bot API client
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    base: Url,
    max_retries: usize,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl TelegramClient {
    /// Build a client from the `telegram` config section
    pub fn new(config: &TelegramConfig) -> BotResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        let base = Url::parse(&format!(
            "{}/bot{}/",
            config.api_url.trim_end_matches('/'),
            config.token
        ))
        .map_err(|e| BotError::Setup(format!("invalid api_url: {e}")))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_second)
                .ok_or_else(|| BotError::Setup("rate limit must be greater than 0".to_string()))?,
        );

        Ok(Self {
            client,
            base,
            max_retries: config.max_retries,
            rate_limiter: Arc::new(DefaultDirectRateLimiter::direct(quota)),
        })
    }

    async fn send_once<T, P>(&self, url: &Url, params: &P) -> PlatformResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .post(url.clone())
            .json(params)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            if status.is_server_error() {
                PlatformError::Api {
                    code: i64::from(status.as_u16()),
                    description: status.to_string(),
                }
            } else {
                PlatformError::Decode(e.to_string())
            }
        })?;

        match envelope.into_result() {
            Err(PlatformError::RateLimited { retry_after }) => {
                warn!(retry_after, "Flood limit hit, waiting");
                tokio::time::sleep(Duration::from_secs(retry_after)).await;
                Err(PlatformError::RateLimited { retry_after })
            }
            other => other,
        }
    }

    /// Call a Bot API method
    #[instrument(skip(self, params), fields(method = %method))]
    pub async fn call<T, P>(&self, method: &str, params: &P) -> PlatformResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        let url = self
            .base
            .join(method)
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        let strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.max_retries);

        let result = RetryIf::spawn(
            strategy,
            || self.send_once(&url, params),
            |e: &PlatformError| {
                let retry = should_retry(method, e);
                if retry {
                    warn!(error = %e, "Transient Bot API failure, retrying");
                }
                retry
            },
        )
        .await;

        if let Err(e) = &result {
            debug!(error = %e, "Bot API call failed");
        }
        result
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64, timeout_seconds: u64) -> PlatformResult<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_seconds,
                "allowed_updates": ALLOWED_UPDATES,
            }),
        )
        .await
    }

    /// Register the slash-command menu
    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> PlatformResult<()> {
        let _: bool = self
            .call("setMyCommands", &json!({ "commands": commands }))
            .await?;
        Ok(())
    }
}

fn unix(until: Option<DateTime<Utc>>) -> i64 {
    until.map_or(0, |t| t.timestamp())
}

#[async_trait]
impl ChatPlatform for TelegramClient {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
        keyboard: Option<InlineKeyboard>,
    ) -> PlatformResult<MessageId> {
        let mut params = json!({
            "chat_id": chat.0,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(reply_to) = reply_to {
            params["reply_parameters"] = json!({
                "message_id": reply_to.0,
                "allow_sending_without_reply": true,
            });
        }
        if let Some(keyboard) = keyboard {
            params["reply_markup"] = json!(InlineKeyboardMarkup::from(keyboard));
        }

        let message: Message = self.call("sendMessage", &params).await?;
        Ok(MessageId(message.message_id))
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> PlatformResult<()> {
        let mut params = json!({
            "chat_id": chat.0,
            "message_id": message.0,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(keyboard) = keyboard {
            params["reply_markup"] = json!(InlineKeyboardMarkup::from(keyboard));
        }

        match self.call::<serde_json::Value, _>("editMessageText", &params).await {
            Ok(_) => Ok(()),
            Err(PlatformError::Api { description, .. }) if description.contains(NOT_MODIFIED) => {
                debug!(%chat, %message, "Edit skipped, content unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn answer_callback(&self, callback_id: &str, notice: Option<String>) -> PlatformResult<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_id, "text": notice }),
            )
            .await?;
        Ok(())
    }

    async fn restrict_member(
        &self,
        chat: ChatId,
        user: UserId,
        permissions: MemberPermissions,
        until: Option<DateTime<Utc>>,
    ) -> PlatformResult<()> {
        let _: bool = self
            .call(
                "restrictChatMember",
                &json!({
                    "chat_id": chat.0,
                    "user_id": user.0,
                    "permissions": ChatPermissions::from(permissions),
                    "use_independent_chat_permissions": true,
                    "until_date": unix(until),
                }),
            )
            .await?;
        Ok(())
    }

    async fn ban_member(
        &self,
        chat: ChatId,
        user: UserId,
        until: Option<DateTime<Utc>>,
    ) -> PlatformResult<()> {
        let _: bool = self
            .call(
                "banChatMember",
                &json!({ "chat_id": chat.0, "user_id": user.0, "until_date": unix(until) }),
            )
            .await?;
        Ok(())
    }

    async fn unban_member(&self, chat: ChatId, user: UserId, only_if_banned: bool) -> PlatformResult<()> {
        let _: bool = self
            .call(
                "unbanChatMember",
                &json!({ "chat_id": chat.0, "user_id": user.0, "only_if_banned": only_if_banned }),
            )
            .await?;
        Ok(())
    }

    async fn get_chat_member(&self, chat: ChatId, user: UserId) -> PlatformResult<ChatMember> {
        let raw: RawChatMember = self
            .call("getChatMember", &json!({ "chat_id": chat.0, "user_id": user.0 }))
            .await?;
        raw.try_into()
    }

    async fn get_chat_administrators(&self, chat: ChatId) -> PlatformResult<Vec<ChatMember>> {
        let raw: Vec<RawChatMember> = self
            .call("getChatAdministrators", &json!({ "chat_id": chat.0 }))
            .await?;
        raw.into_iter().map(ChatMember::try_from).collect()
    }

    async fn get_member_count(&self, chat: ChatId) -> PlatformResult<u64> {
        self.call("getChatMemberCount", &json!({ "chat_id": chat.0 }))
            .await
    }

    async fn get_me(&self) -> PlatformResult<UserProfile> {
        let me: User = self.call("getMe", &json!({})).await?;
        Ok(me.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TelegramConfig {
        TelegramConfig {
            token: "123:abc".to_string(),
            ..TelegramConfig::default()
        }
    }

    #[test]
    fn test_method_urls() {
        let client = TelegramClient::new(&config()).unwrap();
        assert_eq!(
            client.base.join("getMe").unwrap().as_str(),
            "https://api.telegram.org/bot123:abc/getMe"
        );
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        let mut config = config();
        config.rate_limit_per_second = 0;
        assert!(matches!(TelegramClient::new(&config), Err(BotError::Setup(_))));
    }

    #[test]
    fn test_sends_retry_only_unsent_failures() {
        let timeout = PlatformError::Transport("operation timed out".to_string());
        let refused = PlatformError::Connect("connection refused".to_string());

        assert!(!should_retry("sendMessage", &timeout));
        assert!(!should_retry("editMessageText", &timeout));
        assert!(should_retry("sendMessage", &refused));
        assert!(should_retry("sendMessage", &PlatformError::RateLimited { retry_after: 1 }));

        assert!(should_retry("restrictChatMember", &timeout));
        assert!(should_retry("getChatMember", &refused));
        assert!(!should_retry(
            "getChatMember",
            &PlatformError::Api { code: 400, description: "Bad Request".to_string() }
        ));
    }

    #[test]
    fn test_forever_is_zero() {
        assert_eq!(unix(None), 0);
    }
}
