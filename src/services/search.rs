// src/services/search.rs

//! Keyword search service.
//!
//! Two execution modes share one activation guard: the remote search
//! endpoint (itself paginated) and an in-memory deep scan across the
//! nested fields of an already-fetched corpus.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{CollectionItem, PageQuery};
use crate::services::source::CollectionSource;

/// Minimum trimmed query length before a search executes. Enforced here,
/// centrally; callers must not re-implement the threshold.
pub const MIN_QUERY_LEN: usize = 2;

/// Trim a raw query and apply the activation guard. `None` means the input
/// is a silent no-op, not an error.
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_QUERY_LEN {
        return None;
    }
    Some(trimmed.to_string())
}

/// One page of server-side search results.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub query: String,
    pub items: Vec<CollectionItem>,
    pub total_items: u64,
    pub total_pages: u32,
    pub page: u32,
}

impl SearchResults {
    /// Ids of this page's matches, for reconciliation against rendered
    /// entries.
    pub fn result_ids(&self) -> HashSet<u64> {
        self.items.iter().map(|item| item.id).collect()
    }
}

/// Search service for one collection.
pub struct SearchEngine {
    source: Arc<dyn CollectionSource>,
}

impl SearchEngine {
    pub fn new(source: Arc<dyn CollectionSource>) -> Self {
        Self { source }
    }

    /// Server-side search: one paginated request per page transition.
    ///
    /// Pagination metadata is reported faithfully from the upstream totals;
    /// the caller's page bar is driven by those, not by the returned item
    /// count. Returns `Ok(None)` when the query fails the activation guard
    /// (no request is made).
    pub async fn search(
        &self,
        raw_query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Option<SearchResults>> {
        let Some(query) = normalize_query(raw_query) else {
            log::debug!("Search skipped: query below {MIN_QUERY_LEN} characters");
            return Ok(None);
        };

        let fetched = self
            .source
            .page(&PageQuery::searching(query.clone(), page, per_page))
            .await?;

        log::debug!(
            "Search \"{query}\" page {page}: {} of {} item(s)",
            fetched.items.len(),
            fetched.total_items
        );

        Ok(Some(SearchResults {
            query,
            items: fetched.items,
            total_items: fetched.total_items,
            total_pages: fetched.total_pages,
            page,
        }))
    }

    /// In-memory deep search across a fetched corpus. Returns the matching
    /// subset in corpus order, or `None` when the query fails the
    /// activation guard.
    pub fn search_local<'a>(
        &self,
        raw_query: &str,
        corpus: &'a [CollectionItem],
    ) -> Option<Vec<&'a CollectionItem>> {
        let query = normalize_query(raw_query)?;
        let needle = query.to_lowercase();

        let matches: Vec<&CollectionItem> = corpus
            .iter()
            .filter(|item| deep_match(item, &needle))
            .collect();

        log::debug!("Deep search \"{query}\": {} match(es)", matches.len());
        Some(matches)
    }
}

/// Ordered short-circuit scan: title, outline, tag names, category names,
/// basics blob, credited names. The first matching field decides; later
/// fields are not evaluated for the item. All fields are plain text by the
/// time records are normalized, so comparison is a lowercase substring
/// check.
fn deep_match(item: &CollectionItem, needle: &str) -> bool {
    if item.title.to_lowercase().contains(needle) {
        return true;
    }
    if item.outline.to_lowercase().contains(needle) {
        return true;
    }
    if item
        .tags
        .iter()
        .any(|tag| tag.name.to_lowercase().contains(needle))
    {
        return true;
    }
    if item
        .categories
        .iter()
        .any(|category| category.name.to_lowercase().contains(needle))
    {
        return true;
    }
    if item
        .basics
        .iter()
        .any(|(_, value)| value.to_lowercase().contains(needle))
    {
        return true;
    }
    if item
        .credits
        .iter()
        .any(|name| name.to_lowercase().contains(needle))
    {
        return true;
    }
    false
}
