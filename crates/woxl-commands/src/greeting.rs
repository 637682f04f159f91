//! `/start`

use crate::context::CommandContext;
use crate::error::CommandResult;
use chrono::Utc;
use woxl_common::escape_html;
use woxl_i18n::fluent_args;
use woxl_moderation::IncomingMessage;

/// Greet the caller and register the chat
pub async fn start(ctx: &CommandContext, message: &IncomingMessage) -> CommandResult<()> {
    let args = fluent_args![
        "name" => escape_html(&message.from.full_name()),
        "bot" => escape_html(&ctx.settings().bot.name),
    ];
    ctx.platform
        .send_message(message.chat_id, &ctx.t("greeting", args.as_ref()), None, None)
        .await?;

    ctx.db.register_chat(message.chat_id, Utc::now()).await?;
    Ok(())
}
