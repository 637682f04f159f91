//! `ping` and its variants

use crate::context::CommandContext;
use crate::error::CommandResult;
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{debug, instrument};
use woxl_common::{escape_html, ActionKind};
use woxl_i18n::fluent_args;
use woxl_moderation::{IncomingMessage, Remaining, UnitLabels};

/// What a `ping` asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingVariant {
    /// Plain latency
    Pong,
    /// `ping woxl`: the greeting
    Hello,
    /// Chat statistics
    Chat,
    /// Caller's profile
    Me,
    /// Bot statistics
    Bot,
    /// Process information, creators only
    System,
    /// Detailed latency report
    Full,
}

impl PingVariant {
    /// Unknown arguments fall back to a plain pong
    #[must_use]
    pub fn parse(args: &str) -> Self {
        let arg = args.trim().to_lowercase();
        match arg.as_str() {
            "wox" | "woxl" => Self::Hello,
            "chat" => Self::Chat,
            "me" => Self::Me,
            "bot" => Self::Bot,
            "system" => Self::System,
            _ if arg.starts_with("full") => Self::Full,
            _ => Self::Pong,
        }
    }
}

/// Elapsed time since `since`, in the same units as list expiries
#[must_use]
pub fn uptime(since: DateTime<Utc>, now: DateTime<Utc>, labels: &UnitLabels) -> String {
    match Remaining::between(now, since) {
        Remaining::Expired => format!("0{}", labels.second),
        left => left.render(labels),
    }
}

async fn api_latency_ms(ctx: &CommandContext) -> u128 {
    let started = Instant::now();
    if let Err(e) = ctx.platform.get_me().await {
        debug!(error = %e, "getMe failed during ping");
    }
    started.elapsed().as_millis()
}

/// `ping`, `пинг`, `/ping` with an optional variant
#[instrument(skip(ctx, message), fields(chat = %message.chat_id))]
pub async fn ping(ctx: &CommandContext, message: &IncomingMessage, args: &str) -> CommandResult<()> {
    let chat = message.chat_id;
    let not_available = || ctx.t("common-not-available", None);

    let text = match PingVariant::parse(args) {
        PingVariant::Pong => {
            let ms = api_latency_ms(ctx).await;
            ctx.t("ping-pong", fluent_args!["ms" => ms.to_string()].as_ref())
        }
        PingVariant::Hello => {
            let args = fluent_args![
                "name" => escape_html(&message.from.full_name()),
                "bot" => escape_html(&ctx.settings().bot.name),
            ];
            ctx.t("greeting", args.as_ref())
        }
        PingVariant::Chat => {
            let title = message
                .chat_title
                .as_deref()
                .map_or_else(not_available, escape_html);
            let members = ctx
                .platform
                .get_member_count(chat)
                .await
                .map_or_else(|_| not_available(), |n| n.to_string());
            let admins = ctx
                .platform
                .get_chat_administrators(chat)
                .await
                .map_or_else(|_| not_available(), |a| a.len().to_string());
            let args = fluent_args!["title" => title, "members" => members, "admins" => admins];
            ctx.t("ping-chat", args.as_ref())
        }
        PingVariant::Me => {
            let user = message.from.id;
            let nick = ctx
                .db
                .get_nick(chat, user)?
                .map_or_else(|| ctx.t("ping-nick-unset", None), |n| escape_html(&n.nick));
            let violations = ctx.db.count_for_user(ActionKind::Warn, chat, user)?;
            let args = fluent_args![
                "name" => escape_html(&message.from.full_name()),
                "nick" => nick,
                "violations" => violations,
            ];
            ctx.t("ping-me", args.as_ref())
        }
        PingVariant::Bot => {
            let args = fluent_args![
                "bot" => escape_html(&ctx.settings().bot.name),
                "chats" => ctx.db.chat_count(),
                "uptime" => uptime(ctx.started_at, Utc::now(), &ctx.unit_labels()),
            ];
            ctx.t("ping-bot", args.as_ref())
        }
        PingVariant::System => {
            if ctx.settings().bot.is_creator(message.from.id) {
                let args = fluent_args![
                    "uptime" => uptime(ctx.started_at, Utc::now(), &ctx.unit_labels()),
                    "version" => env!("CARGO_PKG_VERSION"),
                ];
                ctx.t("ping-system", args.as_ref())
            } else {
                ctx.t("ping-denied", None)
            }
        }
        PingVariant::Full => {
            let ms = api_latency_ms(ctx).await;
            ctx.t("ping-full", fluent_args!["telegram" => ms.to_string()].as_ref())
        }
    };

    ctx.reply(message, &text).await
}
