//! Staff list and role management commands

use crate::context::CommandContext;
use crate::error::CommandResult;
use crate::reply::target_guidance;
use chrono::Utc;
use woxl_common::{Role, UserId};
use woxl_i18n::fluent_args;
use woxl_moderation::{
    numeric_id, resolve, IncomingMessage, RoleOutcome, Target, ROLE_MANAGEMENT_MIN,
};
use woxl_storage::RoleUpsert;

/// `?админы`: staff grouped by role, highest first
pub async fn staff(ctx: &CommandContext, message: &IncomingMessage) -> CommandResult<()> {
    let chat = message.chat_id;
    let assignments = ctx.db.list_roles(chat)?;
    if assignments.is_empty() {
        return ctx.reply(message, &ctx.t("role-staff-empty", None)).await;
    }

    let mut lines = vec![ctx.t("role-staff-title", None), String::new()];
    for role in Role::ALL_DESCENDING {
        let members: Vec<UserId> = assignments
            .iter()
            .filter(|a| a.role == role)
            .map(|a| a.user_id)
            .collect();
        if members.is_empty() {
            continue;
        }

        let args = fluent_args!["level" => role.level(), "role" => ctx.t(role.message_key(), None)];
        lines.push(ctx.t("role-staff-group", args.as_ref()));
        for user in members {
            let user = ctx.user_ref(chat, user, None).await;
            lines.push(ctx.t("role-staff-member", fluent_args!["user" => user].as_ref()));
        }
        lines.push(String::new());
    }

    ctx.reply(message, lines.join("\n").trim_end()).await
}

async fn outcome_text(
    ctx: &CommandContext,
    message: &IncomingMessage,
    target: UserId,
    hint: Option<&str>,
    outcome: RoleOutcome,
) -> String {
    let user = ctx.user_ref(message.chat_id, target, hint).await;
    let with_role = |key: &str, role: Role| {
        let args = fluent_args![
            "user" => user.clone(),
            "role" => ctx.t(role.message_key(), None),
            "level" => role.level(),
        ];
        ctx.t(key, args.as_ref())
    };
    let with_user = |key: &str| ctx.t(key, fluent_args!["user" => user.clone()].as_ref());

    match outcome {
        RoleOutcome::Denied => ctx.t("role-denied", None),
        RoleOutcome::TooHigh => ctx.t("role-too-high", None),
        RoleOutcome::TargetOutranks => with_user("role-target-outranks"),
        RoleOutcome::SelfRemove => ctx.t("role-self-remove", None),
        RoleOutcome::SelfDemote => ctx.t("role-self-demote", None),
        RoleOutcome::NoRole => with_user("role-none"),
        RoleOutcome::AtMax => with_user("role-promote-max"),
        RoleOutcome::AtMin => with_user("role-demote-min"),
        RoleOutcome::Assigned {
            role,
            upsert: RoleUpsert::Created,
        } => with_role("role-granted", role),
        RoleOutcome::Assigned {
            role,
            upsert: RoleUpsert::Updated { .. },
        } => with_role("role-updated", role),
        RoleOutcome::Removed { .. } => with_user("role-removed"),
        RoleOutcome::Promoted { role } => with_role("role-promoted", role),
        RoleOutcome::Demoted { role } => with_role("role-demoted", role),
    }
}

async fn is_owner(ctx: &CommandContext, message: &IncomingMessage) -> CommandResult<bool> {
    Ok(ctx
        .guard()
        .authorize(message.chat_id, message.from.id, ROLE_MANAGEMENT_MIN)
        .await?
        .granted()
        .is_some())
}

/// `назначить [id] <role>` or as a reply `назначить <role>`
pub async fn assign(ctx: &CommandContext, message: &IncomingMessage, args: &str) -> CommandResult<()> {
    if !is_owner(ctx, message).await? {
        return ctx.reply(message, &ctx.t("role-denied", None)).await;
    }

    let mut tokens = args.split_whitespace();
    let (target, hint, role_arg) = match &message.reply_to {
        Some(author) => (Some(author.id), Some(author.full_name()), tokens.next()),
        None => (tokens.next().and_then(numeric_id), None, tokens.next()),
    };
    let (Some(target), Some(role_arg)) = (target, role_arg) else {
        return ctx.reply(message, &ctx.t("role-assign-usage", None)).await;
    };

    let Some(role) = Role::parse_name(role_arg) else {
        let available = Role::ALL_DESCENDING
            .iter()
            .rev()
            .map(|r| r.level().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let text = ctx.t("role-unknown", fluent_args!["available" => available].as_ref());
        return ctx.reply(message, &text).await;
    };

    let outcome = ctx
        .roles
        .assign(message.chat_id, message.from.id, target, role, Utc::now())
        .await?;
    let text = outcome_text(ctx, message, target, hint.as_deref(), outcome).await;
    ctx.reply(message, &text).await
}

/// Which single-step role change to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleStep {
    /// Delete the role
    Remove,
    /// One level up
    Promote,
    /// One level down
    Demote,
}

/// `снять роль`, `повысить`, `понизить` with a reply or a numeric id
pub async fn step(
    ctx: &CommandContext,
    message: &IncomingMessage,
    step: RoleStep,
    args: &str,
) -> CommandResult<()> {
    if !is_owner(ctx, message).await? {
        return ctx.reply(message, &ctx.t("role-denied", None)).await;
    }

    let (target, hint) = match resolve(message, args) {
        Target::User { id, display_hint } => (id, display_hint),
        Target::Unresolved => return ctx.reply(message, &ctx.t("role-target-required", None)).await,
        handle @ Target::Handle(_) => return ctx.reply(message, &target_guidance(ctx, &handle)).await,
    };

    let (chat, caller, now) = (message.chat_id, message.from.id, Utc::now());
    let outcome = match step {
        RoleStep::Remove => ctx.roles.remove(chat, caller, target).await?,
        RoleStep::Promote => ctx.roles.promote(chat, caller, target, now).await?,
        RoleStep::Demote => ctx.roles.demote(chat, caller, target, now).await?,
    };
    let text = outcome_text(ctx, message, target, hint.as_deref(), outcome).await;
    ctx.reply(message, &text).await
}
