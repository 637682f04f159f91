//! Reply fragments shared by several handlers

use crate::context::CommandContext;
use woxl_common::escape_html;
use woxl_moderation::Target;

/// Guidance for a command whose target could not be resolved
#[must_use]
pub fn target_guidance(ctx: &CommandContext, target: &Target) -> String {
    match target {
        Target::Handle(_) => ctx.t("target-handle", None),
        Target::User { .. } | Target::Unresolved => ctx.t("target-unresolved", None),
    }
}

/// Escaped user text, or a localised placeholder when absent
#[must_use]
pub fn text_or(ctx: &CommandContext, text: Option<&str>, fallback_key: &str) -> String {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => escape_html(text),
        None => ctx.t(fallback_key, None),
    }
}
