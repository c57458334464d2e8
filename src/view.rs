// src/view.rs

//! View seam between the controller and whatever renders the listing.
//!
//! The same controller mounts on several page templates, so a view may
//! legitimately lack a region (e.g. no pickup area on a flat listing);
//! that is routine and logged, never an error.

use crate::models::{CollectionItem, CollectionKind, CollectionProfile, PageSlot, ViewMoreConfig};
use crate::services::ListEntry;

/// Render target for one listing.
pub trait ListView: Send {
    /// Render the pinned pickup prefix (page 1, default view only).
    fn render_pickup(&mut self, items: &[CollectionItem]);

    /// Hide the pickup region (later pages, search mode).
    fn hide_pickup(&mut self);

    /// Render the numbered-list entries; hidden entries stay in place.
    fn render_entries(&mut self, entries: &[ListEntry]);

    /// Render the page-number control.
    fn render_page_bar(&mut self, slots: &[PageSlot]);

    /// Hide the page-number control (single page, client search).
    fn hide_page_bar(&mut self);

    /// Show the search summary line.
    fn render_search_info(&mut self, summary: &str);

    /// Clear the search summary (back to the default listing).
    fn clear_search_info(&mut self);

    /// Toggle the archived-entries link.
    fn set_archived_link_visible(&mut self, visible: bool);

    /// Show an inline, user-visible error message.
    fn show_error(&mut self, message: &str);

    /// Reveal pre-existing static content after a fetch failure.
    fn reveal_fallback(&mut self);

    /// Bring the top of the list region into view.
    fn scroll_to_list_top(&mut self);

    /// Reflect the canonical listing location (path + query).
    fn update_location(&mut self, location: &str);
}

/// Terminal rendering of a listing.
pub struct ConsoleView {
    kind: CollectionKind,
    /// Collections without a pinned prefix have no pickup region.
    has_pickup_region: bool,
    /// Long lists collapse behind a view-more hint.
    view_state: ViewState,
}

impl ConsoleView {
    pub fn new(kind: CollectionKind, profile: &CollectionProfile, view_more: ViewMoreConfig) -> Self {
        Self {
            kind,
            has_pickup_region: profile.skip_count > 0,
            view_state: ViewState::new(view_more),
        }
    }

    /// Show every entry instead of collapsing long lists.
    pub fn expand_all(&mut self) {
        self.view_state.expand();
    }
}

impl ListView for ConsoleView {
    fn render_pickup(&mut self, items: &[CollectionItem]) {
        if !self.has_pickup_region {
            // Routine: this template has no pickup mount point.
            log::debug!("{}: no pickup region on this listing; skipping", self.kind);
            return;
        }

        println!("PICK UP");
        for item in items {
            println!("  * {}  {}", item.sort_label(), item.title);
        }
        println!();
    }

    fn hide_pickup(&mut self) {
        if self.has_pickup_region {
            log::debug!("{}: pickup region hidden", self.kind);
        }
    }

    fn render_entries(&mut self, entries: &[ListEntry]) {
        let visible: Vec<&ListEntry> = entries.iter().filter(|entry| entry.visible).collect();
        let filtered_out = entries.len() - visible.len();
        if filtered_out > 0 {
            log::debug!(
                "{}: {filtered_out} entr(ies) hidden by the active filter",
                self.kind
            );
        }

        let shown = self.view_state.visible_count(visible.len());
        for (index, entry) in visible.iter().take(shown).enumerate() {
            let item = &entry.item;
            let categories: Vec<&str> =
                item.categories.iter().map(|t| t.name.as_str()).collect();
            println!(
                "{:>3}. {}  {}  [{}]",
                index + 1,
                item.sort_label(),
                item.title,
                categories.join(", ")
            );
        }

        if visible.len() > shown {
            println!("  … VIEW MORE ({} more)", visible.len() - shown);
        }
        if visible.is_empty() {
            println!("  (no entries)");
        }
    }

    fn render_page_bar(&mut self, slots: &[PageSlot]) {
        let rendered: Vec<String> = slots
            .iter()
            .map(|slot| match slot {
                PageSlot::Page(n) => n.to_string(),
                PageSlot::Current(n) => format!("[{n}]"),
                PageSlot::Ellipsis => "…".to_string(),
            })
            .collect();
        println!("\nPrev  {}  Next", rendered.join("  "));
    }

    fn hide_page_bar(&mut self) {
        log::debug!("{}: page bar hidden (single page)", self.kind);
    }

    fn render_search_info(&mut self, summary: &str) {
        println!("{summary}");
        println!();
    }

    fn clear_search_info(&mut self) {
        log::debug!("{}: search summary cleared", self.kind);
    }

    fn set_archived_link_visible(&mut self, visible: bool) {
        if visible {
            println!("(archived entries available: add --archived)");
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("! {message}");
    }

    fn reveal_fallback(&mut self) {
        println!("  (showing previously published content)");
    }

    fn scroll_to_list_top(&mut self) {
        log::debug!("{}: scrolled to list top", self.kind);
    }

    fn update_location(&mut self, location: &str) {
        log::info!("location: {location}");
    }
}

/// Expand/collapse bookkeeping for a truncated list ("view more").
///
/// Purely presentational, layered on an already-rendered set; independent
/// of pagination and search state.
#[derive(Debug, Clone)]
pub struct ViewState {
    config: ViewMoreConfig,
    expanded: bool,
}

impl ViewState {
    pub fn new(config: ViewMoreConfig) -> Self {
        Self {
            config,
            expanded: false,
        }
    }

    /// Expand the list. Idempotent: expanding an already-expanded view
    /// changes nothing. Returns whether the state changed.
    pub fn expand(&mut self) -> bool {
        if self.expanded {
            return false;
        }
        self.expanded = true;
        true
    }

    /// Collapse back to the initial state.
    pub fn reset(&mut self) {
        self.expanded = false;
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// How many of `total` items are visible in the current state.
    pub fn visible_count(&self, total: usize) -> usize {
        if self.expanded {
            total
        } else {
            total.min(self.config.max_visible_items)
        }
    }

    /// Estimated collapsed height up to and including `item_index`.
    pub fn collapsed_height(&self, item_index: usize) -> u32 {
        (item_index as u32 + 1) * self.config.item_height_px + self.config.collapsed_offset_px
    }

    /// Collapsed height for a list of `total` items; 0 when no collapse is
    /// needed (everything already fits).
    pub fn collapsed_height_for(&self, total: usize) -> u32 {
        if total <= self.config.max_visible_items {
            return 0;
        }
        self.collapsed_height(self.config.max_visible_items - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_state() -> ViewState {
        ViewState::new(ViewMoreConfig {
            max_visible_items: 10,
            item_height_px: 100,
            collapsed_offset_px: 150,
        })
    }

    #[test]
    fn test_expand_is_idempotent() {
        let mut state = view_state();
        assert_eq!(state.visible_count(25), 10);

        assert!(state.expand());
        let once = state.visible_count(25);

        assert!(!state.expand());
        let twice = state.visible_count(25);

        assert_eq!(once, 25);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reset_collapses() {
        let mut state = view_state();
        state.expand();
        state.reset();
        assert!(!state.is_expanded());
        assert_eq!(state.visible_count(25), 10);
    }

    #[test]
    fn test_collapsed_height() {
        let state = view_state();
        assert_eq!(state.collapsed_height(9), 1150);
        assert_eq!(state.collapsed_height_for(25), 1150);
        // Everything fits: no collapse.
        assert_eq!(state.collapsed_height_for(8), 0);
    }
}
