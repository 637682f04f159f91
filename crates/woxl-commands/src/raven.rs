//! `/send_raven_bot`: creators relay a message into another chat

use crate::context::CommandContext;
use crate::error::CommandResult;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};
use woxl_common::{escape_html, ChatId};
use woxl_i18n::fluent_args;
use woxl_moderation::IncomingMessage;

static PRIVATE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?://)?t\.me/c/(\d+)/\d+").expect("private link pattern is valid")
});

/// Chat id of a `t.me/c/<short>/<msg>` link; supergroup ids are `-100<short>`
#[must_use]
pub fn chat_from_link(link: &str) -> Option<ChatId> {
    let short = PRIVATE_LINK.captures(link)?.get(1)?.as_str();
    format!("-100{short}").parse().ok().map(ChatId)
}

/// Relay `text` to the chat named by `link`
pub async fn send_raven(ctx: &CommandContext, message: &IncomingMessage, args: &str) -> CommandResult<()> {
    if !ctx.settings().bot.is_creator(message.from.id) {
        return ctx.reply(message, &ctx.t("raven-denied", None)).await;
    }

    let Some((link, text)) = args
        .split_once(char::is_whitespace)
        .map(|(link, text)| (link.trim(), text.trim()))
        .filter(|(link, text)| !link.is_empty() && !text.is_empty())
    else {
        return ctx.reply(message, &ctx.t("raven-usage", None)).await;
    };

    let Some(destination) = chat_from_link(link) else {
        return ctx.reply(message, &ctx.t("raven-bad-link", None)).await;
    };

    let reply = match ctx.platform.send_message(destination, text, None, None).await {
        Ok(_) => {
            info!(from = %message.from.id, %destination, "Relayed message");
            ctx.t("raven-sent", None)
        }
        Err(e) => {
            warn!(%destination, error = %e, "Relay failed");
            ctx.t("raven-failed", fluent_args!["error" => escape_html(&e.to_string())].as_ref())
        }
    };
    ctx.reply(message, &reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_from_link() {
        assert_eq!(
            chat_from_link("https://t.me/c/3413026178/1"),
            Some(ChatId(-1_003_413_026_178))
        );
        assert_eq!(chat_from_link("t.me/c/12/345"), Some(ChatId(-10_012)));
        assert_eq!(chat_from_link("https://t.me/woxl/1"), None);
        assert_eq!(chat_from_link("https://t.me/c/abc/1"), None);
    }
}
