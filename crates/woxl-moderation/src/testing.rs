//! Recording in-memory platform for end-to-end tests

use crate::platform::{
    ChatMember, ChatPlatform, InlineKeyboard, MemberPermissions, MemberStatus, PlatformError,
    PlatformResult, UserProfile,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use woxl_common::{ChatId, MessageId, UserId};

/// A call made against [`FakePlatform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    /// `send_message`
    Send {
        /// Chat
        chat: ChatId,
        /// Text
        text: String,
        /// Replied-to message
        reply_to: Option<MessageId>,
        /// Attached buttons
        keyboard: Option<InlineKeyboard>,
    },
    /// `edit_message`
    Edit {
        /// Chat
        chat: ChatId,
        /// Edited message
        message: MessageId,
        /// New text
        text: String,
        /// New buttons
        keyboard: Option<InlineKeyboard>,
    },
    /// `answer_callback`
    Answer {
        /// Callback id
        callback_id: String,
        /// Notice text
        notice: Option<String>,
    },
    /// `restrict_member`
    Restrict {
        /// Chat
        chat: ChatId,
        /// User
        user: UserId,
        /// Applied permissions
        permissions: MemberPermissions,
        /// Expiry
        until: Option<DateTime<Utc>>,
    },
    /// `ban_member`
    Ban {
        /// Chat
        chat: ChatId,
        /// User
        user: UserId,
        /// Expiry
        until: Option<DateTime<Utc>>,
    },
    /// `unban_member`
    Unban {
        /// Chat
        chat: ChatId,
        /// User
        user: UserId,
        /// Whether present members are left alone
        only_if_banned: bool,
    },
}

#[derive(Debug, Default)]
struct State {
    members: HashMap<(ChatId, UserId), ChatMember>,
    calls: Vec<PlatformCall>,
    fail_edits: bool,
    fail_effects: bool,
}

/// In-memory platform that records every mutating call.
///
/// Members are registered up front; unknown members fail lookups like the
/// real API does.
#[derive(Debug)]
pub struct FakePlatform {
    state: Mutex<State>,
    next_message: AtomicI64,
    me: UserProfile,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    /// Empty platform with a bot account named "Woxl"
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_message: AtomicI64::new(1_000),
            me: profile(UserId(777), "Woxl"),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a member
    pub fn add_member(&self, chat: ChatId, user: UserId, name: &str, status: MemberStatus) {
        self.state().members.insert(
            (chat, user),
            ChatMember {
                user: profile(user, name),
                status,
            },
        );
    }

    /// Make edits fail
    pub fn fail_edits(&self, fail: bool) {
        self.state().fail_edits = fail;
    }

    /// Make restrict, ban and unban fail
    pub fn fail_effects(&self, fail: bool) {
        self.state().fail_effects = fail;
    }

    /// All recorded calls
    #[must_use]
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state().calls.clone()
    }

    /// Texts of sent messages, oldest first
    #[must_use]
    pub fn sent_texts(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                PlatformCall::Send { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Text of the newest sent message
    #[must_use]
    pub fn last_sent(&self) -> Option<String> {
        self.sent_texts().pop()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn record_effect(&self, call: PlatformCall) -> PlatformResult<()> {
        let mut state = self.state();
        state.calls.push(call);
        if state.fail_effects {
            Err(PlatformError::Api {
                code: 400,
                description: "Bad Request: not enough rights".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn profile(id: UserId, name: &str) -> UserProfile {
    UserProfile {
        id,
        first_name: name.to_string(),
        last_name: None,
        username: None,
        is_bot: false,
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
        keyboard: Option<InlineKeyboard>,
    ) -> PlatformResult<MessageId> {
        self.state().calls.push(PlatformCall::Send {
            chat,
            text: text.to_string(),
            reply_to,
            keyboard,
        });
        Ok(MessageId(self.next_message.fetch_add(1, Ordering::Relaxed)))
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> PlatformResult<()> {
        let mut state = self.state();
        state.calls.push(PlatformCall::Edit {
            chat,
            message,
            text: text.to_string(),
            keyboard,
        });
        if state.fail_edits {
            return Err(PlatformError::Api {
                code: 400,
                description: "Bad Request: message to edit not found".to_string(),
            });
        }
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, notice: Option<String>) -> PlatformResult<()> {
        self.state().calls.push(PlatformCall::Answer {
            callback_id: callback_id.to_string(),
            notice,
        });
        Ok(())
    }

    async fn restrict_member(
        &self,
        chat: ChatId,
        user: UserId,
        permissions: MemberPermissions,
        until: Option<DateTime<Utc>>,
    ) -> PlatformResult<()> {
        self.record_effect(PlatformCall::Restrict {
            chat,
            user,
            permissions,
            until,
        })
    }

    async fn ban_member(
        &self,
        chat: ChatId,
        user: UserId,
        until: Option<DateTime<Utc>>,
    ) -> PlatformResult<()> {
        self.record_effect(PlatformCall::Ban { chat, user, until })
    }

    async fn unban_member(&self, chat: ChatId, user: UserId, only_if_banned: bool) -> PlatformResult<()> {
        self.record_effect(PlatformCall::Unban {
            chat,
            user,
            only_if_banned,
        })
    }

    async fn get_chat_member(&self, chat: ChatId, user: UserId) -> PlatformResult<ChatMember> {
        self.state()
            .members
            .get(&(chat, user))
            .cloned()
            .ok_or_else(|| PlatformError::Api {
                code: 400,
                description: "Bad Request: user not found".to_string(),
            })
    }

    async fn get_chat_administrators(&self, chat: ChatId) -> PlatformResult<Vec<ChatMember>> {
        Ok(self
            .state()
            .members
            .iter()
            .filter(|((c, _), m)| {
                *c == chat && matches!(m.status, MemberStatus::Creator | MemberStatus::Administrator)
            })
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn get_member_count(&self, chat: ChatId) -> PlatformResult<u64> {
        let count = self
            .state()
            .members
            .iter()
            .filter(|((c, _), m)| *c == chat && m.status.is_present())
            .count();
        Ok(count as u64)
    }

    async fn get_me(&self) -> PlatformResult<UserProfile> {
        Ok(self.me.clone())
    }
}
