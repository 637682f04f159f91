//! Bot API wire types and their conversion into engine types

use serde::{Deserialize, Serialize};
use woxl_commands::MembershipChange;
use woxl_common::{ChatId, MessageId, UserId};
use woxl_moderation::{
    ChatMember, IncomingCallback, IncomingMessage, InlineKeyboard, MemberPermissions,
    MemberStatus, PlatformError, PlatformResult, UserProfile,
};

/// Envelope of every Bot API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded
    pub ok: bool,
    /// Payload on success
    pub result: Option<T>,
    /// Error description on failure
    pub description: Option<String>,
    /// Error code on failure
    pub error_code: Option<i64>,
    /// Extra failure details
    pub parameters: Option<ResponseParameters>,
}

/// Failure details
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait after a flood limit
    pub retry_after: Option<u64>,
}

impl<T> ApiResponse<T> {
    /// Turn the envelope into a result
    pub fn into_result(self) -> PlatformResult<T> {
        if self.ok {
            return self
                .result
                .ok_or_else(|| PlatformError::Decode("successful response without result".to_string()));
        }
        if let Some(retry_after) = self.parameters.and_then(|p| p.retry_after) {
            return Err(PlatformError::RateLimited { retry_after });
        }
        Err(PlatformError::Api {
            code: self.error_code.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        })
    }
}

/// A Bot API user
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User id
    pub id: i64,
    /// Bot account flag
    #[serde(default)]
    pub is_bot: bool,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: Option<String>,
    /// Handle
    pub username: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: UserId(user.id),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            is_bot: user.is_bot,
        }
    }
}

/// A chat
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat id
    pub id: i64,
    /// Group title
    pub title: Option<String>,
}

/// A formatting entity inside message text
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEntity {
    /// Entity type, e.g. `text_mention`
    #[serde(rename = "type")]
    pub kind: String,
    /// Mentioned user of a `text_mention`
    pub user: Option<User>,
}

/// A message
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message id
    pub message_id: i64,
    /// Author; absent for channel posts
    pub from: Option<User>,
    /// Chat
    pub chat: Chat,
    /// Text
    pub text: Option<String>,
    /// Text entities
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
    /// Message this one replies to
    pub reply_to_message: Option<Box<Message>>,
}

impl Message {
    /// Engine view of a text message with a known author
    #[must_use]
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let from = self.from?;
        let text = self.text?;
        let text_mentions = self
            .entities
            .into_iter()
            .filter(|e| e.kind == "text_mention")
            .filter_map(|e| e.user.map(UserProfile::from))
            .collect();

        Some(IncomingMessage {
            chat_id: ChatId(self.chat.id),
            chat_title: self.chat.title,
            message_id: MessageId(self.message_id),
            from: from.into(),
            text,
            reply_to: self
                .reply_to_message
                .and_then(|reply| reply.from)
                .map(UserProfile::from),
            text_mentions,
        })
    }
}

/// An inline button press
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Query id
    pub id: String,
    /// Presser
    pub from: User,
    /// Message the button belongs to
    pub message: Option<Message>,
    /// Button payload
    pub data: Option<String>,
}

impl CallbackQuery {
    /// Engine view; `None` without a message or payload
    #[must_use]
    pub fn into_incoming(self) -> Option<IncomingCallback> {
        let message = self.message?;
        Some(IncomingCallback {
            id: self.id,
            from: self.from.into(),
            chat_id: ChatId(message.chat.id),
            message_id: MessageId(message.message_id),
            data: self.data?,
        })
    }
}

/// Membership entry as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct RawChatMember {
    /// Status string
    pub status: String,
    /// Member
    pub user: User,
}

impl TryFrom<RawChatMember> for ChatMember {
    type Error = PlatformError;

    fn try_from(raw: RawChatMember) -> PlatformResult<Self> {
        let status = MemberStatus::from_api(&raw.status)
            .ok_or_else(|| PlatformError::Decode(format!("unknown member status {}", raw.status)))?;
        Ok(Self {
            user: raw.user.into(),
            status,
        })
    }
}

/// A change of the bot's own membership
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMemberUpdated {
    /// Chat
    pub chat: Chat,
    /// New membership
    pub new_chat_member: RawChatMember,
}

impl ChatMemberUpdated {
    /// Engine view; `None` for unknown statuses
    #[must_use]
    pub fn into_change(self) -> Option<MembershipChange> {
        Some(MembershipChange {
            chat_id: ChatId(self.chat.id),
            status: MemberStatus::from_api(&self.new_chat_member.status)?,
        })
    }
}

/// One long-poll update
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id
    pub update_id: i64,
    /// New message
    pub message: Option<Message>,
    /// Button press
    pub callback_query: Option<CallbackQuery>,
    /// Bot membership change
    pub my_chat_member: Option<ChatMemberUpdated>,
}

/// Update kinds requested from `getUpdates`
pub const ALLOWED_UPDATES: [&str; 3] = ["message", "callback_query", "my_chat_member"];

/// Button as sent to the API
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    /// Caption
    pub text: String,
    /// Payload returned on press
    pub callback_data: String,
}

/// Reply markup carrying inline buttons
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    /// Rows of buttons
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl From<InlineKeyboard> for InlineKeyboardMarkup {
    fn from(keyboard: InlineKeyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|b| InlineKeyboardButton {
                            text: b.text,
                            callback_data: b.callback_data,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

/// Send permissions as sent to the API
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatPermissions {
    can_send_messages: bool,
    can_send_audios: bool,
    can_send_documents: bool,
    can_send_photos: bool,
    can_send_videos: bool,
    can_send_video_notes: bool,
    can_send_voice_notes: bool,
    can_send_polls: bool,
    can_send_other_messages: bool,
    can_add_web_page_previews: bool,
}

impl From<MemberPermissions> for ChatPermissions {
    fn from(p: MemberPermissions) -> Self {
        let media = p.can_send_media_messages;
        Self {
            can_send_messages: p.can_send_messages,
            can_send_audios: media,
            can_send_documents: p.can_send_documents,
            can_send_photos: media,
            can_send_videos: media,
            can_send_video_notes: media,
            can_send_voice_notes: media,
            can_send_polls: p.can_send_polls,
            can_send_other_messages: p.can_send_other_messages,
            can_add_web_page_previews: p.can_add_web_page_previews,
        }
    }
}

/// Entry of the slash-command menu
#[derive(Debug, Clone, Serialize)]
pub struct BotCommand {
    /// Command without the slash
    pub command: String,
    /// Menu description
    pub description: String,
}
