//! Page slicing and page-change tokens for list views

use crate::platform::{InlineButton, InlineKeyboard};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use woxl_common::{ActionKind, UserId};

/// Rows per list page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of an ordered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// Items on this page
    pub items: &'a [T],
    /// Page number after clamping, 1-based
    pub page: usize,
    /// Number of pages, at least 1
    pub total_pages: usize,
    /// Number of items across all pages
    pub total: usize,
    /// 1-based index of the first item, continuous across pages
    pub first_index: usize,
}

/// Slice `items` into pages and return the requested one.
///
/// Out-of-range page numbers are clamped. Returns `None` for an empty list.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Option<Page<'_, T>> {
    if items.is_empty() {
        return None;
    }
    let page_size = page_size.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);

    Some(Page {
        items: &items[start..end],
        page,
        total_pages,
        total,
        first_index: start + 1,
    })
}

/// Errors decoding a page token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageTokenError {
    /// The list kind is not one of `warns`, `mutes`, `bans`
    #[error("unknown list kind '{0}'")]
    UnknownKind(String),
    /// The token has no `kind:page` shape
    #[error("malformed page token '{0}'")]
    Malformed(String),
}

/// Opaque `"<kind>:<page>[:<user>]"` token carried by navigation buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageToken {
    /// Which list
    pub kind: ActionKind,
    /// Requested page, at least 1
    pub page: usize,
    /// User the list is scoped to
    pub target: Option<UserId>,
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.list_kind(), self.page)?;
        if let Some(target) = self.target {
            write!(f, ":{target}")?;
        }
        Ok(())
    }
}

impl FromStr for PageToken {
    type Err = PageTokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut parts = token.split(':');
        let (Some(kind), Some(page)) = (parts.next(), parts.next()) else {
            return Err(PageTokenError::Malformed(token.to_string()));
        };
        let kind = ActionKind::from_list_kind(kind)
            .ok_or_else(|| PageTokenError::UnknownKind(kind.to_string()))?;
        let page = page.parse::<usize>().unwrap_or(1).max(1);
        let target = parts.next().and_then(|id| id.parse().ok()).map(UserId);

        Ok(Self { kind, page, target })
    }
}

/// Two-button previous/next control, both clamped to the page range
#[must_use]
pub fn navigation_keyboard(
    kind: ActionKind,
    page: usize,
    total_pages: usize,
    target: Option<UserId>,
) -> InlineKeyboard {
    let button = |text: &str, page: usize| InlineButton {
        text: text.to_string(),
        callback_data: PageToken { kind, page, target }.to_string(),
    };
    vec![vec![
        button("⬅️", page.saturating_sub(1).max(1)),
        button("➡️", (page + 1).min(total_pages.max(1))),
    ]]
}
