//! User references in rendered output

use crate::platform::ChatPlatform;
use tracing::warn;
use woxl_common::{user_link, ChatId, UserId};
use woxl_storage::Database;

/// Preferred name of a user: stored nick, then `hint`, then the platform
/// profile name, then the numeric id.
pub async fn display_name(
    db: &Database,
    platform: &dyn ChatPlatform,
    chat: ChatId,
    user: UserId,
    hint: Option<&str>,
) -> String {
    match db.get_nick(chat, user) {
        Ok(Some(nick)) => return nick.nick,
        Ok(None) => {}
        Err(e) => warn!(%chat, %user, error = %e, "Nick lookup failed"),
    }

    if let Some(hint) = hint.filter(|h| !h.trim().is_empty()) {
        return hint.to_string();
    }

    match platform.get_chat_member(chat, user).await {
        Ok(member) => member.user.full_name(),
        Err(_) => user.to_string(),
    }
}

/// HTML link to a user labelled with [`display_name`]
pub async fn display_ref(
    db: &Database,
    platform: &dyn ChatPlatform,
    chat: ChatId,
    user: UserId,
    hint: Option<&str>,
) -> String {
    user_link(user, &display_name(db, platform, chat, user, hint).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ChatMember, MemberStatus, MockChatPlatform, PlatformError, UserProfile};
    use woxl_common::test_utils::mock_timestamp;

    const CHAT: ChatId = ChatId(1);

    fn platform_with_name(name: &'static str) -> MockChatPlatform {
        let mut platform = MockChatPlatform::new();
        platform.expect_get_chat_member().returning(move |_, user| {
            Ok(ChatMember {
                user: UserProfile {
                    id: user,
                    first_name: name.to_string(),
                    last_name: None,
                    username: None,
                    is_bot: false,
                },
                status: MemberStatus::Member,
            })
        });
        platform
    }

    #[tokio::test]
    async fn test_nick_wins() {
        let db = Database::temporary().unwrap();
        db.set_nick(CHAT, UserId(5), "Wox", mock_timestamp(2025, 1, 1, 0, 0, 0))
            .await
            .unwrap();
        let platform = MockChatPlatform::new();
        assert_eq!(display_name(&db, &platform, CHAT, UserId(5), Some("Bob")).await, "Wox");
    }

    #[tokio::test]
    async fn test_hint_skips_lookup() {
        let db = Database::temporary().unwrap();
        let mut platform = MockChatPlatform::new();
        platform.expect_get_chat_member().never();
        assert_eq!(display_name(&db, &platform, CHAT, UserId(5), Some("Bob")).await, "Bob");
    }

    #[tokio::test]
    async fn test_profile_then_id() {
        let db = Database::temporary().unwrap();
        let platform = platform_with_name("Alice");
        assert_eq!(display_name(&db, &platform, CHAT, UserId(5), None).await, "Alice");

        let mut failing = MockChatPlatform::new();
        failing
            .expect_get_chat_member()
            .returning(|_, _| Err(PlatformError::Transport("timeout".into())));
        assert_eq!(display_name(&db, &failing, CHAT, UserId(5), None).await, "5");
    }

    #[tokio::test]
    async fn test_reference_is_escaped_link() {
        let db = Database::temporary().unwrap();
        let platform = platform_with_name("<b>x</b>");
        assert_eq!(
            display_ref(&db, &platform, CHAT, UserId(5), None).await,
            r#"<a href="tg://user?id=5">&lt;b&gt;x&lt;/b&gt;</a>"#
        );
    }
}
