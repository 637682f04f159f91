//! The bot's own membership changes

use crate::context::CommandContext;
use crate::error::CommandResult;
use chrono::Utc;
use tracing::{debug, info};
use woxl_common::ChatId;
use woxl_moderation::MemberStatus;

/// The bot's new status in a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipChange {
    /// Chat the update concerns
    pub chat_id: ChatId,
    /// New status of the bot account
    pub status: MemberStatus,
}

/// Register the chat and make its creator Owner once the bot is in
pub async fn bot_membership_changed(ctx: &CommandContext, change: MembershipChange) -> CommandResult<()> {
    if !matches!(change.status, MemberStatus::Member | MemberStatus::Administrator) {
        debug!(chat = %change.chat_id, status = change.status.as_str(), "Ignoring membership change");
        return Ok(());
    }

    let now = Utc::now();
    ctx.db.register_chat(change.chat_id, now).await?;
    let owner = ctx
        .roles
        .reconcile_owner(ctx.platform.as_ref(), change.chat_id, now)
        .await?;
    info!(chat = %change.chat_id, ?owner, "Joined chat");
    Ok(())
}
