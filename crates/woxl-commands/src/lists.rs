//! Active warning, mute and ban lists with page navigation
//!
//! Every render reads the active records afresh, so a page change after a
//! concurrent revocation shows the current state.

use crate::context::CommandContext;
use crate::error::CommandResult;
use crate::reply::text_or;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use woxl_common::{format_in_zone, ActionKind, ChatId, UserId, LIST_DATETIME_FORMAT};
use woxl_i18n::fluent_args;
use woxl_moderation::{
    navigation_keyboard, paginate, IncomingCallback, IncomingMessage, InlineKeyboard,
    PageToken, Remaining,
};

/// A rendered list page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedList {
    /// Message text
    pub text: String,
    /// Navigation buttons
    pub keyboard: InlineKeyboard,
}

/// Render one page of the active list, or `None` when nothing is active
pub async fn render_page(
    ctx: &CommandContext,
    kind: ActionKind,
    chat: ChatId,
    target: Option<UserId>,
    page: usize,
    now: DateTime<Utc>,
) -> CommandResult<Option<RenderedList>> {
    let settings = ctx.settings();
    let records = ctx.moderation.active(kind, chat, target)?;
    let Some(page) = paginate(&records, page, settings.moderation.page_size) else {
        return Ok(None);
    };

    let zone = settings.zone();
    let labels = ctx.unit_labels();
    let list_kind = kind.list_kind();

    let mut lines = Vec::with_capacity(page.items.len() + 4);
    lines.push(match target {
        Some(user) => {
            let user = ctx.user_ref(chat, user, None).await;
            ctx.t("list-header-target", fluent_args!["kind" => list_kind, "user" => user].as_ref())
        }
        None => ctx.t("list-header", fluent_args!["kind" => list_kind].as_ref()),
    });
    lines.push(ctx.t(
        "list-total",
        fluent_args!["kind" => list_kind, "total" => page.total].as_ref(),
    ));
    lines.push(ctx.t("list-items", fluent_args!["kind" => list_kind].as_ref()));

    for (offset, record) in page.items.iter().enumerate() {
        let user = ctx.user_ref(chat, record.user_id, None).await;
        let issuer = match record.issued_by {
            Some(issuer) => ctx.user_ref(chat, issuer, None).await,
            None => ctx.t("common-system", None),
        };
        let remaining = record.until.map_or_else(
            || ctx.t("common-no-expiry", None),
            |until| Remaining::between(until, now).render(&labels),
        );
        let args = fluent_args![
            "index" => page.first_index + offset,
            "user" => user,
            "reason" => text_or(ctx, record.reason.as_deref(), "common-no-reason"),
            "remaining" => remaining,
            "issuer" => issuer,
            "created" => format_in_zone(record.created_at, zone, LIST_DATETIME_FORMAT),
        ];
        lines.push(ctx.t("list-row", args.as_ref()));
    }

    lines.push(ctx.t(
        "list-page",
        fluent_args!["page" => page.page, "pages" => page.total_pages].as_ref(),
    ));

    Ok(Some(RenderedList {
        text: lines.join("\n"),
        keyboard: navigation_keyboard(kind, page.page, page.total_pages, target),
    }))
}

/// `?пред`, `мутлист`, `банлист` and aliases. A reply scopes the list to
/// the replied-to user; a numeric argument selects the page.
pub async fn list(
    ctx: &CommandContext,
    message: &IncomingMessage,
    kind: ActionKind,
    args: &str,
) -> CommandResult<()> {
    let chat = message.chat_id;
    let page = args
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<usize>().ok())
        .unwrap_or(1);
    let target = message.reply_to.as_ref().map(|author| author.id);

    match render_page(ctx, kind, chat, target, page, Utc::now()).await? {
        Some(rendered) => {
            ctx.reply_with_keyboard(message, &rendered.text, rendered.keyboard)
                .await
        }
        None => {
            let text = match target {
                Some(user) => {
                    let hint = message.reply_to.as_ref().map(|a| a.full_name());
                    let user = ctx.user_ref(chat, user, hint.as_deref()).await;
                    ctx.t(
                        "list-empty-target",
                        fluent_args!["kind" => kind.list_kind(), "user" => user].as_ref(),
                    )
                }
                None => ctx.t("list-empty", fluent_args!["kind" => kind.list_kind()].as_ref()),
            };
            ctx.reply(message, &text).await
        }
    }
}

/// Handle a navigation button press
pub async fn change_page(ctx: &CommandContext, callback: &IncomingCallback) -> CommandResult<()> {
    let token: PageToken = match callback.data.parse() {
        Ok(token) => token,
        Err(e) => {
            debug!(data = %callback.data, error = %e, "Unsupported page token");
            ctx.platform
                .answer_callback(&callback.id, Some(ctx.t("common-unknown-list", None)))
                .await?;
            return Ok(());
        }
    };

    let rendered = render_page(
        ctx,
        token.kind,
        callback.chat_id,
        token.target,
        token.page,
        Utc::now(),
    )
    .await?;

    let Some(rendered) = rendered else {
        ctx.platform.answer_callback(&callback.id, None).await?;
        return Ok(());
    };

    let edited = ctx
        .platform
        .edit_message(
            callback.chat_id,
            callback.message_id,
            &rendered.text,
            Some(rendered.keyboard),
        )
        .await;

    let notice = match edited {
        Ok(()) => None,
        Err(e) => {
            warn!(chat = %callback.chat_id, error = %e, "Page edit failed");
            Some(ctx.t("common-page-update-failed", None))
        }
    };
    ctx.platform.answer_callback(&callback.id, notice).await?;
    Ok(())
}
