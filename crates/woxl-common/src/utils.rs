//! Shared utility functions for HTML replies and timestamps.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Date and time layout used in list rows.
pub const LIST_DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Time-first layout used when confirming an expiry.
pub const UNTIL_DATETIME_FORMAT: &str = "%H:%M:%S %d.%m.%Y";

/// Escapes text for Telegram's HTML parse mode.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Clickable mention of a user by id.
#[must_use]
pub fn user_link(user_id: crate::UserId, name: &str) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        user_id,
        escape_html(name)
    )
}

/// Wraps already-escaped text in bold tags.
#[must_use]
pub fn bold(text: &str) -> String {
    format!("<b>{text}</b>")
}

/// Formats a UTC instant in the given zone.
#[must_use]
pub fn format_in_zone(timestamp: DateTime<Utc>, zone: Tz, pattern: &str) -> String {
    timestamp.with_timezone(&zone).format(pattern).to_string()
}

/// Parses an IANA zone name such as `Europe/Moscow`.
#[must_use]
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

/// Truncates a string to a maximum number of characters with ellipsis.
#[must_use]
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
