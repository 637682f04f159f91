//! Per-chat display nicknames

use crate::context::CommandContext;
use crate::error::CommandResult;
use chrono::Utc;
use tracing::debug;
use woxl_common::user_link;
use woxl_i18n::fluent_args;
use woxl_moderation::{resolve, IncomingMessage, Target};

/// Longest accepted nickname, in characters
pub const NICK_MAX_CHARS: usize = 64;

const fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{115F}'
            | '\u{1160}'
            | '\u{200B}'..='\u{200F}'
            | '\u{2060}'..='\u{2064}'
            | '\u{3164}'
            | '\u{FEFF}'
    )
}

/// Outcome of checking a requested nickname
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NickInput {
    /// Nothing after the command
    Missing,
    /// Only whitespace or invisible characters
    Blank,
    /// Over [`NICK_MAX_CHARS`]
    TooLong,
    /// Trimmed nickname ready to store
    Valid(String),
}

impl NickInput {
    /// Classify the argument text of a set command
    #[must_use]
    pub fn parse(args: &str) -> Self {
        if args.trim().is_empty() && !args.chars().any(is_invisible) {
            return Self::Missing;
        }
        if args.chars().all(|c| c.is_whitespace() || is_invisible(c)) {
            return Self::Blank;
        }

        let nick = args.trim();
        if nick.chars().count() > NICK_MAX_CHARS {
            Self::TooLong
        } else {
            Self::Valid(nick.to_string())
        }
    }
}

/// `+ник <name>` and `ник <name>`
pub async fn set(ctx: &CommandContext, message: &IncomingMessage, args: &str) -> CommandResult<()> {
    let nick = match NickInput::parse(args) {
        NickInput::Missing => return ctx.reply(message, &ctx.t("nick-usage", None)).await,
        NickInput::Blank => return ctx.reply(message, &ctx.t("nick-empty", None)).await,
        NickInput::TooLong => {
            let text = ctx.t("nick-too-long", fluent_args!["max" => NICK_MAX_CHARS].as_ref());
            return ctx.reply(message, &text).await;
        }
        NickInput::Valid(nick) => nick,
    };

    let user = message.from.id;
    let stored = ctx.db.set_nick(message.chat_id, user, &nick, Utc::now()).await?;
    debug!(chat = %message.chat_id, %user, "Nickname set");

    let text = ctx.t("nick-set", fluent_args!["user" => user_link(user, &stored.nick)].as_ref());
    ctx.reply(message, &text).await
}

/// `-ник`
pub async fn delete(ctx: &CommandContext, message: &IncomingMessage) -> CommandResult<()> {
    let key = if ctx.db.remove_nick(message.chat_id, message.from.id).await? {
        "nick-deleted"
    } else {
        "nick-none"
    };
    ctx.reply(message, &ctx.t(key, None)).await
}

/// `?ник`: the caller's own nickname, or another user's by reply or id
pub async fn show(ctx: &CommandContext, message: &IncomingMessage, args: &str) -> CommandResult<()> {
    let caller = &message.from;
    let (target, hint) = if args.trim().is_empty() && message.reply_to.is_none() {
        (caller.id, Some(caller.full_name()))
    } else {
        match resolve(message, args) {
            Target::User { id, display_hint } => (id, display_hint),
            Target::Handle(_) => return ctx.reply(message, &ctx.t("nick-handle-hint", None)).await,
            Target::Unresolved => return ctx.reply(message, &ctx.t("nick-unresolved", None)).await,
        }
    };

    let has_nick = ctx.db.get_nick(message.chat_id, target)?.is_some();
    let user = ctx.user_ref(message.chat_id, target, hint.as_deref()).await;
    let key = match (target == caller.id, has_nick) {
        (true, true) => "nick-self",
        (true, false) => "nick-self-unset",
        (false, true) => "nick-other",
        (false, false) => "nick-other-unset",
    };
    ctx.reply(message, &ctx.t(key, fluent_args!["user" => user].as_ref()))
        .await
}

/// Bare `ник`: sets with an argument, shows the caller's own otherwise
pub async fn nick(ctx: &CommandContext, message: &IncomingMessage, args: &str) -> CommandResult<()> {
    if args.trim().is_empty() {
        show(ctx, message, "").await
    } else {
        set(ctx, message, args).await
    }
}
