//! Which user a command applies to

use crate::platform::IncomingMessage;
use woxl_common::UserId;

/// Outcome of target resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A concrete user
    User {
        /// Resolved id
        id: UserId,
        /// Profile name known from the message, if any
        display_hint: Option<String>,
    },
    /// Only an `@handle` was given; handles are never resolved to ids
    Handle(String),
    /// Nothing identifies a user
    Unresolved,
}

impl Target {
    /// The resolved id, if any
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User { id, .. } => Some(*id),
            Self::Handle(_) | Self::Unresolved => None,
        }
    }
}

/// Parse a token made only of ASCII digits as a user id
#[must_use]
pub fn numeric_id(token: &str) -> Option<UserId> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok().map(UserId)
}

/// Resolve the target of a command.
///
/// `args` is the message text after the command word. The first match wins:
/// the replied-to author, a digit-only argument, a rich mention, and finally
/// an `@handle`, which resolves to [`Target::Handle`] so the caller can ask
/// for a reply or an id instead.
#[must_use]
pub fn resolve(message: &IncomingMessage, args: &str) -> Target {
    if let Some(author) = &message.reply_to {
        return Target::User {
            id: author.id,
            display_hint: Some(author.full_name()),
        };
    }

    if let Some(id) = args.split_whitespace().find_map(numeric_id) {
        return Target::User {
            id,
            display_hint: None,
        };
    }

    if let Some(mentioned) = message.text_mentions.first() {
        return Target::User {
            id: mentioned.id,
            display_hint: Some(mentioned.full_name()),
        };
    }

    if let Some(handle) = args.split_whitespace().find(|t| t.starts_with('@') && t.len() > 1) {
        return Target::Handle(handle.to_string());
    }

    Target::Unresolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::UserProfile;
    use woxl_common::{ChatId, MessageId};

    fn user(id: i64, name: &str) -> UserProfile {
        UserProfile {
            id: UserId(id),
            first_name: name.to_string(),
            last_name: None,
            username: None,
            is_bot: false,
        }
    }

    fn message(text: &str) -> IncomingMessage {
        IncomingMessage {
            chat_id: ChatId(100),
            chat_title: None,
            message_id: MessageId(1),
            from: user(1, "Owner"),
            text: text.to_string(),
            reply_to: None,
            text_mentions: Vec::new(),
        }
    }

    #[test]
    fn test_reply_wins_over_arguments() {
        let mut msg = message("+мут 77 10м");
        msg.reply_to = Some(user(42, "Bob"));
        assert_eq!(
            resolve(&msg, "77 10м"),
            Target::User {
                id: UserId(42),
                display_hint: Some("Bob".to_string())
            }
        );
    }

    #[test]
    fn test_first_numeric_argument() {
        let msg = message("+варн спам 12345 55");
        assert_eq!(resolve(&msg, "спам 12345 55").user_id(), Some(UserId(12345)));
    }

    #[test]
    fn test_mention_after_numeric() {
        let mut msg = message("+бан Bob");
        msg.text_mentions.push(user(9, "Bob"));
        assert_eq!(resolve(&msg, "Bob").user_id(), Some(UserId(9)));
        assert_eq!(resolve(&msg, "5 Bob").user_id(), Some(UserId(5)));
    }

    #[test]
    fn test_handle_is_not_resolved() {
        let msg = message("+мут @bob 1ч");
        assert_eq!(resolve(&msg, "@bob 1ч"), Target::Handle("@bob".to_string()));
    }

    #[test]
    fn test_unresolved() {
        let msg = message("+мут 1ч флуд");
        assert_eq!(resolve(&msg, "1ч флуд"), Target::Unresolved);
        assert_eq!(resolve(&msg, "@"), Target::Unresolved);
    }

    #[test]
    fn test_numeric_id_rejects_signs_and_mixed() {
        assert_eq!(numeric_id("42"), Some(UserId(42)));
        assert_eq!(numeric_id("-42"), None);
        assert_eq!(numeric_id("42a"), None);
        assert_eq!(numeric_id(""), None);
        assert_eq!(numeric_id("99999999999999999999"), None);
    }
}
