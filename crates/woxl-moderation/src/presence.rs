//! Liveness check before mute, ban and kick

use crate::platform::{ChatPlatform, MemberStatus};
use tracing::debug;
use woxl_common::{ChatId, UserId};

/// Current membership of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    /// Whether the user is confirmed to be in the chat
    pub present: bool,
    /// Status reported by the platform, `None` if the lookup failed
    pub status: Option<MemberStatus>,
}

/// Query membership. A failed lookup counts as absent.
pub async fn is_present(platform: &dyn ChatPlatform, chat: ChatId, user: UserId) -> Presence {
    match platform.get_chat_member(chat, user).await {
        Ok(member) => Presence {
            present: member.status.is_present(),
            status: Some(member.status),
        },
        Err(e) => {
            debug!(%chat, %user, error = %e, "Membership lookup failed, treating as absent");
            Presence {
                present: false,
                status: None,
            }
        }
    }
}
