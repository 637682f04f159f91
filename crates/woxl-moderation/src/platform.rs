//! Messaging platform abstraction
//!
//! The engine talks to the chat service only through [`ChatPlatform`]. The
//! binary implements it over the Telegram Bot API; tests use the recording
//! fake from the `testing` feature or the generated `MockChatPlatform`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use woxl_common::{ChatId, MessageId, UserId};

/// Errors returned by platform calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The API rejected the request
    #[error("platform API error {code}: {description}")]
    Api {
        /// API error code
        code: i64,
        /// Human-readable description
        description: String,
    },

    /// Too many requests; retry later
    #[error("rate limited, retry after {retry_after} seconds")]
    RateLimited {
        /// Seconds to wait
        retry_after: u64,
    },

    /// The connection could not be established; the request was not sent
    #[error("connection failed: {0}")]
    Connect(String),

    /// Network or timeout failure after the request may have been sent
    #[error("transport error: {0}")]
    Transport(String),

    /// Response could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Whether the call may succeed when repeated
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Api { code, .. } => *code >= 500,
            Self::RateLimited { .. } | Self::Connect(_) | Self::Transport(_) => true,
            Self::Decode(_) => false,
        }
    }

    /// Whether the server certainly did not act on the request
    #[must_use]
    pub const fn is_unsent(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::RateLimited { .. })
    }
}

/// Result alias for platform calls
pub type PlatformResult<T> = Result<T, PlatformError>;

/// A platform user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// User id
    pub id: UserId,
    /// First name, always present
    pub first_name: String,
    /// Last name
    pub last_name: Option<String>,
    /// `@handle` without the `@`
    pub username: Option<String>,
    /// Whether the account is a bot
    pub is_bot: bool,
}

impl UserProfile {
    /// First and last name joined by a space
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

/// Membership status of a user in a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    /// The chat owner
    Creator,
    /// A platform administrator
    Administrator,
    /// An ordinary member
    Member,
    /// A member with restrictions
    Restricted,
    /// Left the chat
    Left,
    /// Banned from the chat
    Kicked,
}

impl MemberStatus {
    /// Parse the API status string
    #[must_use]
    pub fn from_api(status: &str) -> Option<Self> {
        match status {
            "creator" => Some(Self::Creator),
            "administrator" => Some(Self::Administrator),
            "member" => Some(Self::Member),
            "restricted" => Some(Self::Restricted),
            "left" => Some(Self::Left),
            "kicked" => Some(Self::Kicked),
            _ => None,
        }
    }

    /// The API status string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Administrator => "administrator",
            Self::Member => "member",
            Self::Restricted => "restricted",
            Self::Left => "left",
            Self::Kicked => "kicked",
        }
    }

    /// Everything except `left` and `kicked` counts as present
    #[must_use]
    pub const fn is_present(self) -> bool {
        !matches!(self, Self::Left | Self::Kicked)
    }
}

/// A user together with their status in one chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMember {
    /// The member
    pub user: UserProfile,
    /// Their status
    pub status: MemberStatus,
}

/// Send permissions applied by `restrict_member`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MemberPermissions {
    /// Text messages
    pub can_send_messages: bool,
    /// Photos, videos, audio and other media
    pub can_send_media_messages: bool,
    /// Polls
    pub can_send_polls: bool,
    /// Stickers, GIFs, games and inline results
    pub can_send_other_messages: bool,
    /// Link previews
    pub can_add_web_page_previews: bool,
    /// Documents
    pub can_send_documents: bool,
}

impl MemberPermissions {
    /// Everything revoked, applied by a mute
    #[must_use]
    pub const fn muted() -> Self {
        Self {
            can_send_messages: false,
            can_send_media_messages: false,
            can_send_polls: false,
            can_send_other_messages: false,
            can_add_web_page_previews: false,
            can_send_documents: false,
        }
    }

    /// Everything granted, applied when a mute is lifted
    #[must_use]
    pub const fn full() -> Self {
        Self {
            can_send_messages: true,
            can_send_media_messages: true,
            can_send_polls: true,
            can_send_other_messages: true,
            can_add_web_page_previews: true,
            can_send_documents: true,
        }
    }
}

/// One inline button carrying an opaque callback token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    /// Button label
    pub text: String,
    /// Token delivered back on press
    pub callback_data: String,
}

/// Rows of inline buttons attached to a message
pub type InlineKeyboard = Vec<Vec<InlineButton>>;

/// A chat message addressed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Chat the message was posted in
    pub chat_id: ChatId,
    /// Chat title, absent in private chats
    pub chat_title: Option<String>,
    /// Message id
    pub message_id: MessageId,
    /// Author
    pub from: UserProfile,
    /// Message text
    pub text: String,
    /// Author of the message this one replies to
    pub reply_to: Option<UserProfile>,
    /// Users referenced by rich mentions
    pub text_mentions: Vec<UserProfile>,
}

/// A button press on one of the bot's messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
    /// Callback id to acknowledge
    pub id: String,
    /// User who pressed the button
    pub from: UserProfile,
    /// Chat of the message the button belongs to
    pub chat_id: ChatId,
    /// Message the button belongs to
    pub message_id: MessageId,
    /// Opaque callback token
    pub data: String,
}

/// Operations the engine needs from the messaging platform
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Send an HTML message, optionally as a reply and with buttons
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
        keyboard: Option<InlineKeyboard>,
    ) -> PlatformResult<MessageId>;

    /// Replace the text and buttons of a sent message
    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> PlatformResult<()>;

    /// Acknowledge a button press, optionally with a notice
    async fn answer_callback(&self, callback_id: &str, notice: Option<String>) -> PlatformResult<()>;

    /// Change a member's send permissions until `until` (forever when `None`)
    async fn restrict_member(
        &self,
        chat: ChatId,
        user: UserId,
        permissions: MemberPermissions,
        until: Option<DateTime<Utc>>,
    ) -> PlatformResult<()>;

    /// Remove a member until `until` (forever when `None`)
    async fn ban_member(
        &self,
        chat: ChatId,
        user: UserId,
        until: Option<DateTime<Utc>>,
    ) -> PlatformResult<()>;

    /// Lift a ban. With `only_if_banned` a present member is left alone.
    async fn unban_member(&self, chat: ChatId, user: UserId, only_if_banned: bool) -> PlatformResult<()>;

    /// Look up a user's membership
    async fn get_chat_member(&self, chat: ChatId, user: UserId) -> PlatformResult<ChatMember>;

    /// Platform administrators of a chat, creator included
    async fn get_chat_administrators(&self, chat: ChatId) -> PlatformResult<Vec<ChatMember>>;

    /// Number of members in a chat
    async fn get_member_count(&self, chat: ChatId) -> PlatformResult<u64>;

    /// The bot's own account
    async fn get_me(&self) -> PlatformResult<UserProfile>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_presence() {
        for status in ["creator", "administrator", "member", "restricted"] {
            assert!(MemberStatus::from_api(status).unwrap().is_present());
        }
        assert!(!MemberStatus::Left.is_present());
        assert!(!MemberStatus::Kicked.is_present());
        assert_eq!(MemberStatus::from_api("owner"), None);
    }

    #[test]
    fn test_full_name() {
        let mut user = UserProfile {
            id: UserId(1),
            first_name: "Ada".to_string(),
            last_name: None,
            username: None,
            is_bot: false,
        };
        assert_eq!(user.full_name(), "Ada");
        user.last_name = Some("Lovelace".to_string());
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_transient_errors() {
        assert!(PlatformError::Transport("timeout".into()).is_transient());
        assert!(PlatformError::Api { code: 502, description: "Bad Gateway".into() }.is_transient());
        assert!(!PlatformError::Api { code: 400, description: "Bad Request".into() }.is_transient());
    }

    #[test]
    fn test_unsent_errors() {
        assert!(PlatformError::Connect("refused".into()).is_unsent());
        assert!(PlatformError::RateLimited { retry_after: 1 }.is_unsent());
        assert!(!PlatformError::Transport("timeout".into()).is_unsent());
        assert!(!PlatformError::Api { code: 502, description: "Bad Gateway".into() }.is_unsent());
    }
}
