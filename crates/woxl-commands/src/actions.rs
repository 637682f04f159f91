//! Warn, mute, ban and kick commands

use crate::context::CommandContext;
use crate::error::CommandResult;
use crate::reply::{target_guidance, text_or};
use chrono::Utc;
use tracing::{debug, info};
use woxl_common::{format_in_zone, ActionKind, UNTIL_DATETIME_FORMAT};
use woxl_i18n::fluent_args;
use woxl_moderation::{
    parse_grant_args, resolve, Access, ActionPolicy, GrantOutcome, GrantRequest, IncomingMessage,
    KickOutcome, RevokeOutcome, Target, KICK_MIN,
};
use woxl_storage::PunitiveRecord;

fn key(kind: ActionKind, suffix: &str) -> String {
    format!("{}-{suffix}", kind.as_str())
}

async fn granted_text(ctx: &CommandContext, record: &PunitiveRecord, hint: Option<&str>) -> String {
    let user = ctx.user_ref(record.chat_id, record.user_id, hint).await;
    let until = record.until.map_or_else(
        || ctx.t("common-no-expiry", None),
        |until| format_in_zone(until, ctx.settings().zone(), UNTIL_DATETIME_FORMAT),
    );
    let reason = text_or(ctx, record.reason.as_deref(), "common-no-reason");
    let args = fluent_args!["user" => user, "until" => until, "reason" => reason];
    ctx.t(&key(record.kind, "granted"), args.as_ref())
}

/// `+мут`, `+бан`, `+пред` and their aliases
pub async fn grant(
    ctx: &CommandContext,
    message: &IncomingMessage,
    kind: ActionKind,
    args: &str,
) -> CommandResult<()> {
    let chat = message.chat_id;
    let policy = ActionPolicy::of(kind);

    let auth = match ctx.guard().authorize(chat, message.from.id, policy.grant_min).await? {
        Access::Granted(auth) => auth,
        Access::Denied { .. } => {
            return ctx.reply(message, &ctx.t(&key(kind, "denied-grant"), None)).await;
        }
    };

    let Some(grant_args) = parse_grant_args(args, message.reply_to.is_some()) else {
        return ctx.reply(message, &ctx.t(&key(kind, "usage"), None)).await;
    };

    let (target, hint) = match resolve(message, args) {
        Target::User { id, display_hint } => (id, display_hint),
        other => return ctx.reply(message, &target_guidance(ctx, &other)).await,
    };

    let outcome = ctx
        .moderation
        .grant(
            &auth,
            GrantRequest {
                kind,
                target,
                duration: grant_args.duration,
                reason: grant_args.reason,
                now: Utc::now(),
            },
        )
        .await?;

    let text = match outcome {
        GrantOutcome::Denied => ctx.t(&key(kind, "denied-grant"), None),
        GrantOutcome::NotPresent => {
            let user = ctx.user_ref(chat, target, hint.as_deref()).await;
            ctx.t(&key(kind, "not-present"), fluent_args!["user" => user].as_ref())
        }
        GrantOutcome::ExpiryOutOfRange => ctx.t(&key(kind, "usage"), None),
        GrantOutcome::Granted { record, effect } => {
            info!(%kind, %chat, %target, id = record.id, ?effect, "Punitive action granted");
            granted_text(ctx, &record, hint.as_deref()).await
        }
    };
    ctx.reply(message, &text).await
}

/// `-мут`, `разбан`, `-пред` and their aliases
pub async fn revoke(
    ctx: &CommandContext,
    message: &IncomingMessage,
    kind: ActionKind,
    args: &str,
) -> CommandResult<()> {
    let chat = message.chat_id;
    let policy = ActionPolicy::of(kind);

    let auth = match ctx.guard().authorize(chat, message.from.id, policy.revoke_min).await? {
        Access::Granted(auth) => auth,
        Access::Denied { .. } => {
            return ctx.reply(message, &ctx.t(&key(kind, "denied-revoke"), None)).await;
        }
    };

    let (target, hint) = match resolve(message, args) {
        Target::User { id, display_hint } => (id, display_hint),
        other => return ctx.reply(message, &target_guidance(ctx, &other)).await,
    };

    let outcome = ctx.moderation.revoke(&auth, kind, target, Utc::now()).await?;
    let user = ctx.user_ref(chat, target, hint.as_deref()).await;
    let text = match outcome {
        RevokeOutcome::Denied => ctx.t(&key(kind, "denied-revoke"), None),
        RevokeOutcome::NothingActive => {
            debug!(%kind, %chat, %target, "Nothing to revoke");
            ctx.t(&key(kind, "none-active"), fluent_args!["user" => user].as_ref())
        }
        RevokeOutcome::Revoked { record, effect } => {
            info!(%kind, %chat, %target, id = record.id, ?effect, "Punitive action revoked");
            ctx.t(&key(kind, "revoked"), fluent_args!["user" => user].as_ref())
        }
    };
    ctx.reply(message, &text).await
}

/// `кик`
pub async fn kick(ctx: &CommandContext, message: &IncomingMessage, args: &str) -> CommandResult<()> {
    let chat = message.chat_id;
    let Some(auth) = ctx
        .guard()
        .authorize(chat, message.from.id, KICK_MIN)
        .await?
        .granted()
    else {
        return ctx.reply(message, &ctx.t("kick-denied", None)).await;
    };

    let (target, hint) = match resolve(message, args) {
        Target::User { id, display_hint } => (id, display_hint),
        other => return ctx.reply(message, &target_guidance(ctx, &other)).await,
    };

    let user = ctx.user_ref(chat, target, hint.as_deref()).await;
    let text = match ctx.moderation.kick(&auth, target).await {
        KickOutcome::Denied => ctx.t("kick-denied", None),
        KickOutcome::NotPresent => ctx.t("kick-not-present", fluent_args!["user" => user].as_ref()),
        KickOutcome::Kicked { .. } => ctx.t("kick-done", fluent_args!["user" => user].as_ref()),
    };
    ctx.reply(message, &text).await
}
