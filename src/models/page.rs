// src/models/page.rs

//! Pagination, filter, and search-session state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One page of a reserved-prefix paginated collection.
///
/// The pinned pickup prefix (`skip_count` items) is excluded from the
/// numbered pages, so page 1 starts at offset `skip_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page_number: u32,
    pub skip_count: u32,
    pub items_per_page: u32,
}

impl PageWindow {
    /// API offset of the window's first item.
    pub fn offset(&self) -> u64 {
        let page = self.page_number.max(1) as u64;
        self.skip_count as u64 + (page - 1) * self.items_per_page as u64
    }
}

/// Parameters for one collection-endpoint request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageQuery {
    /// 1-based page number; ignored by the API when `offset` is set
    pub page: u32,
    pub per_page: u32,
    /// Explicit skip count for reserved-prefix windows
    pub offset: Option<u64>,
    /// Server-side keyword search
    pub search: Option<String>,
}

impl PageQuery {
    /// Plain numbered page.
    pub fn numbered(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            ..Self::default()
        }
    }

    /// Offset window (numbered listing with a reserved prefix).
    pub fn windowed(offset: u64, per_page: u32) -> Self {
        Self {
            page: 1,
            per_page,
            offset: Some(offset),
            ..Self::default()
        }
    }

    /// Server-side search page.
    pub fn searching(query: impl Into<String>, page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            search: Some(query.into()),
            ..Self::default()
        }
    }
}

/// One slot of the rendered page-number control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    /// Navigable page number
    Page(u32),
    /// The current page (not navigable)
    Current(u32),
    /// Gap marker between non-adjacent page numbers
    Ellipsis,
}

/// Current visibility filter for a listing.
///
/// Dimensions are mutually exclusive with precedence
/// archived > tag > category; all-empty means "non-archived items only".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub archived: bool,
    pub tag: Option<String>,
    pub category: Option<String>,
}

impl FilterState {
    /// Filter for the default listing (non-archived items).
    pub fn show_all() -> Self {
        Self::default()
    }

    pub fn by_category(slug: impl Into<String>) -> Self {
        Self {
            category: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn by_tag(slug: impl Into<String>) -> Self {
        Self {
            tag: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn archived_only() -> Self {
        Self {
            archived: true,
            ..Self::default()
        }
    }

    /// True when no dimension is requested.
    pub fn is_default(&self) -> bool {
        !self.archived && self.tag.is_none() && self.category.is_none()
    }
}

/// Where a search session executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Remote search endpoint, itself paginated
    Server,
    /// In-memory deep scan over a fetched corpus
    ClientDeep,
}

/// Ephemeral state of one active query.
#[derive(Debug, Clone)]
pub struct SearchSession {
    /// Trimmed query (at least the activation-guard length)
    pub query: String,
    pub mode: SearchMode,
    /// Ids used to reconcile against currently-rendered entries
    pub result_ids: HashSet<u64>,
    /// Only meaningful in server mode
    pub page: u32,
    /// Only meaningful in server mode
    pub total_pages: u32,
    pub total_items: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_offset() {
        let window = PageWindow {
            page_number: 3,
            skip_count: 4,
            items_per_page: 14,
        };
        assert_eq!(window.offset(), 32);
    }

    #[test]
    fn test_first_page_offset_is_skip_count() {
        let window = PageWindow {
            page_number: 1,
            skip_count: 4,
            items_per_page: 14,
        };
        assert_eq!(window.offset(), 4);
    }

    #[test]
    fn test_filter_state_default_shows_all() {
        assert!(FilterState::show_all().is_default());
        assert!(!FilterState::by_tag("branding").is_default());
        assert!(!FilterState::archived_only().is_default());
    }
}
