// src/controller.rs

//! Listing orchestration.
//!
//! One controller owns the listing state for one collection in one
//! language: current page, mode (normal vs. search), and the active
//! filter. It is the only component that mutates those; collaborators get
//! read-only accessors. Navigation carries a monotonically increasing
//! generation, and a resolution whose generation has been superseded is
//! discarded, so overlapping requests cannot publish stale state.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{
    CollectionItem, CollectionKind, Config, FilterState, Language, PageQuery, SearchMode,
    SearchSession, SearchModeSetting,
};
use crate::services::{
    CollectionSource, FilterReconciler, ListEntry, OffsetPaginator, SearchEngine, SearchResults,
    normalize_query,
};
use crate::utils::url::{listing_path, listing_query};
use crate::view::ListView;

/// Read-only listing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    Normal,
    Search,
}

#[derive(Debug)]
enum Mode {
    Normal,
    Search(SearchSession),
}

/// Root orchestrator for one listing.
pub struct PaginationController {
    config: Arc<Config>,
    kind: CollectionKind,
    language: Language,
    source: Arc<dyn CollectionSource>,
    search_engine: SearchEngine,
    paginator: OffsetPaginator,
    view: Box<dyn ListView>,

    mode: Mode,
    filter: FilterState,
    current_page: u32,
    total_items: u64,
    pickup: Vec<CollectionItem>,
    entries: Vec<ListEntry>,
    /// Fetched lazily for collections with client-side deep search
    corpus: Option<Vec<CollectionItem>>,
    generation: u64,
}

impl PaginationController {
    pub fn new(
        config: Arc<Config>,
        kind: CollectionKind,
        language: Language,
        source: Arc<dyn CollectionSource>,
        view: Box<dyn ListView>,
    ) -> Self {
        let profile = config.collections.profile(kind);
        let paginator = OffsetPaginator::new(profile.skip_count, profile.items_per_page);
        let search_engine = SearchEngine::new(Arc::clone(&source));

        Self {
            config,
            kind,
            language,
            source,
            search_engine,
            paginator,
            view,
            mode: Mode::Normal,
            filter: FilterState::show_all(),
            current_page: 0,
            total_items: 0,
            pickup: Vec::new(),
            entries: Vec::new(),
            corpus: None,
            generation: 0,
        }
    }

    /// Initial load: fetch and render the requested page; a page beyond the
    /// collection falls back to page 1 instead of erroring.
    pub async fn init(&mut self, page: u32, filter: FilterState) -> Result<()> {
        self.filter = filter;

        let requested = page.max(1);
        if let Err(error) = self.show_page(requested).await {
            return self.absorb(error);
        }

        if requested > 1 && requested > self.total_pages() {
            log::warn!(
                "{}: requested page {requested} is beyond the last page; showing page 1",
                self.kind
            );
            if let Err(error) = self.show_page(1).await {
                return self.absorb(error);
            }
        }

        Ok(())
    }

    /// Navigate to a page. Pages outside `[1, total]` and the current page
    /// are no-ops and issue no request.
    pub async fn go_to_page(&mut self, page: u32) -> Result<()> {
        let total = self.total_pages();
        if !OffsetPaginator::is_navigable(self.current_page, page, total) {
            log::debug!(
                "{}: ignoring navigation to page {page} (current {}, total {total})",
                self.kind,
                self.current_page
            );
            return Ok(());
        }

        let search_query = match &self.mode {
            Mode::Search(session) => Some(session.query.clone()),
            Mode::Normal => None,
        };

        match search_query {
            Some(query) => match self.search_page(&query, page).await {
                Ok(()) => {
                    self.view.scroll_to_list_top();
                    Ok(())
                }
                Err(error) => self.absorb_search_error(error),
            },
            None => match self.show_page(page).await {
                Ok(()) => {
                    self.view.scroll_to_list_top();
                    Ok(())
                }
                Err(error) => self.absorb(error),
            },
        }
    }

    pub async fn next_page(&mut self) -> Result<()> {
        self.go_to_page(self.current_page.saturating_add(1)).await
    }

    pub async fn prev_page(&mut self) -> Result<()> {
        self.go_to_page(self.current_page.saturating_sub(1)).await
    }

    /// Submit a keyword query. Queries below the activation threshold are
    /// silent no-ops. A valid submission clears the category selection and
    /// switches the listing into search mode.
    pub async fn submit_query(&mut self, raw_query: &str) -> Result<()> {
        // A too-short submission must not bump the generation; the engine
        // re-checks the guard on its own.
        let Some(query) = normalize_query(raw_query) else {
            return Ok(());
        };

        let profile = self.config.collections.profile(self.kind);
        match profile.search {
            SearchModeSetting::Server => {
                let per_page = profile.items_per_page;
                let generation = self.begin_navigation();

                let results = match self.search_engine.search(&query, 1, per_page).await {
                    Ok(results) => results,
                    Err(error) => return self.absorb_search_error(error),
                };
                let Some(results) = results else {
                    return Ok(());
                };
                if !self.is_current(generation) {
                    log::debug!("{}: discarding stale search resolution", self.kind);
                    return Ok(());
                }

                self.filter = FilterState::show_all();
                self.adopt_server_results(results);
            }
            SearchModeSetting::Client => {
                if self.corpus.is_none() {
                    let generation = self.begin_navigation();
                    let corpus = match self.source.all().await {
                        Ok(corpus) => corpus,
                        Err(error) => return self.absorb(error),
                    };
                    if !self.is_current(generation) {
                        log::debug!("{}: discarding stale corpus fetch", self.kind);
                        return Ok(());
                    }
                    self.corpus = Some(corpus);
                }

                let result_ids: HashSet<u64> = {
                    let corpus = self.corpus.as_deref().unwrap_or_default();
                    self.search_engine
                        .search_local(&query, corpus)
                        .unwrap_or_default()
                        .iter()
                        .map(|item| item.id)
                        .collect()
                };

                self.filter = FilterState::show_all();
                let total = result_ids.len() as u64;
                self.mode = Mode::Search(SearchSession {
                    query: query.clone(),
                    mode: SearchMode::ClientDeep,
                    result_ids: result_ids.clone(),
                    page: 1,
                    total_pages: 1,
                    total_items: total,
                });

                // Reconcile by id against the already-rendered entries.
                for entry in &mut self.entries {
                    entry.visible = result_ids.contains(&entry.item.id);
                }

                self.view.hide_pickup();
                self.view.render_entries(&self.entries);
                self.view.hide_page_bar();
                self.view.set_archived_link_visible(false);
                self.render_search_summary(&query, total);
                self.sync_location();
            }
        }

        Ok(())
    }

    /// Change the visibility filter. Any filter change tears search mode
    /// down; in normal mode the rendered entries are reconciled in place
    /// without re-fetching.
    pub async fn set_filter(&mut self, filter: FilterState) -> Result<()> {
        let was_server_search = matches!(
            &self.mode,
            Mode::Search(session) if session.mode == SearchMode::Server
        );

        if matches!(self.mode, Mode::Search(_)) {
            self.mode = Mode::Normal;
            self.view.clear_search_info();
        }
        self.filter = filter;

        if was_server_search {
            // The rendered entries are search results; restore the listing.
            if let Err(error) = self.show_page(1).await {
                return self.absorb(error);
            }
            return Ok(());
        }

        self.apply_filter_and_render();
        Ok(())
    }

    /// Back to the default listing: normal mode, no filter, page 1.
    pub async fn reset(&mut self) -> Result<()> {
        self.mode = Mode::Normal;
        self.filter = FilterState::show_all();
        self.view.clear_search_info();

        if let Err(error) = self.show_page(1).await {
            return self.absorb(error);
        }
        Ok(())
    }

    // --- Read-only state ---

    pub fn mode(&self) -> ListingMode {
        match self.mode {
            Mode::Normal => ListingMode::Normal,
            Mode::Search(_) => ListingMode::Search,
        }
    }

    pub fn session(&self) -> Option<&SearchSession> {
        match &self.mode {
            Mode::Search(session) => Some(session),
            Mode::Normal => None,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn visible_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.visible).count()
    }

    pub fn total_pages(&self) -> u32 {
        match &self.mode {
            Mode::Search(session) if session.mode == SearchMode::Server => {
                session.total_pages.max(1)
            }
            Mode::Search(_) => 1,
            Mode::Normal => self.paginator.total_pages(self.total_items),
        }
    }

    // --- Internals ---

    /// Fetch and render one normal-mode page.
    async fn show_page(&mut self, page: u32) -> Result<()> {
        let generation = self.begin_navigation();
        let profile = self.config.collections.profile(self.kind);

        let pickup = if page == 1 && profile.skip_count > 0 && self.filter.is_default() {
            let prefix = self
                .source
                .page(&PageQuery::windowed(0, profile.skip_count))
                .await?;
            prefix.items
        } else {
            Vec::new()
        };

        let window = self.paginator.window_for(page);
        let fetched = self
            .source
            .page(&PageQuery::windowed(window.offset(), window.items_per_page))
            .await?;

        if !self.is_current(generation) {
            log::debug!("{}: discarding stale navigation to page {page}", self.kind);
            return Ok(());
        }

        self.current_page = page;
        self.total_items = fetched.total_items;
        self.pickup = pickup;
        self.entries = fetched.items.into_iter().map(ListEntry::new).collect();

        self.apply_filter_and_render();
        Ok(())
    }

    /// One server-search page transition.
    async fn search_page(&mut self, query: &str, page: u32) -> Result<()> {
        let per_page = self.config.collections.profile(self.kind).items_per_page;
        let generation = self.begin_navigation();

        let Some(results) = self.search_engine.search(query, page, per_page).await? else {
            return Ok(());
        };
        if !self.is_current(generation) {
            log::debug!("{}: discarding stale search page {page}", self.kind);
            return Ok(());
        }

        self.adopt_server_results(results);
        Ok(())
    }

    fn adopt_server_results(&mut self, results: SearchResults) {
        self.current_page = results.page;
        self.entries = results.items.iter().cloned().map(ListEntry::new).collect();
        self.pickup.clear();

        let total = results.total_items;
        let query = results.query.clone();
        self.mode = Mode::Search(SearchSession {
            query: results.query,
            mode: SearchMode::Server,
            result_ids: self.entries.iter().map(|entry| entry.item.id).collect(),
            page: results.page,
            total_pages: results.total_pages.max(1),
            total_items: total,
        });

        self.view.hide_pickup();
        self.view.render_entries(&self.entries);
        self.render_page_bar();
        self.view.set_archived_link_visible(false);
        self.render_search_summary(&query, total);
        self.sync_location();
    }

    fn apply_filter_and_render(&mut self) {
        let outcome = FilterReconciler::apply(&mut self.entries, &self.filter);
        log::debug!(
            "{}: filter applied, {} visible / {} hidden",
            self.kind,
            outcome.visible,
            outcome.hidden
        );

        if matches!(self.mode, Mode::Normal) && self.current_page == 1 && !self.pickup.is_empty() {
            self.view.render_pickup(&self.pickup);
        } else {
            self.view.hide_pickup();
        }

        self.view.render_entries(&self.entries);
        self.render_page_bar();
        let archived_link = self.archived_link_visible();
        self.view.set_archived_link_visible(archived_link);
        self.sync_location();
    }

    fn render_page_bar(&mut self) {
        let total = self.total_pages();
        if total <= 1 {
            self.view.hide_page_bar();
            return;
        }
        let slots = OffsetPaginator::page_bar(self.current_page.max(1), total);
        self.view.render_page_bar(&slots);
    }

    fn render_search_summary(&mut self, query: &str, total: u64) {
        let messages = &self.config.messages;
        let summary = if total == 0 {
            messages.no_results.get(self.language).to_string()
        } else {
            messages
                .results_for
                .get(self.language)
                .replace("{query}", query)
                .replace("{count}", &total.to_string())
        };
        self.view.render_search_info(&summary);
    }

    /// The archived-entries link shows only on the unfiltered default view,
    /// and only when archived records exist at all.
    fn archived_link_visible(&self) -> bool {
        self.filter.is_default()
            && matches!(self.mode, Mode::Normal)
            && self.entries.iter().any(|entry| entry.item.archived)
    }

    fn sync_location(&mut self) {
        let (search, page) = match &self.mode {
            Mode::Search(session) => (Some(session.query.as_str()), session.page),
            Mode::Normal => (None, self.current_page),
        };
        let location = format!(
            "{}{}",
            listing_path(self.kind, self.language, &self.config.site),
            listing_query(&self.filter, search, page.max(1))
        );
        self.view.update_location(&location);
    }

    fn begin_navigation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Fetch-related errors become a user-visible inline message plus the
    /// static-content fallback; they never propagate past the controller.
    fn absorb(&mut self, error: AppError) -> Result<()> {
        if !error.is_fetch_related() {
            return Err(error);
        }
        log::error!("{}: {error}", self.kind);
        let message = self.config.messages.fetch_failed.get(self.language).to_string();
        self.view.show_error(&message);
        self.view.reveal_fallback();
        Ok(())
    }

    /// A failed search shows zero results plus the error state; the
    /// previous result set is never presented as current.
    fn absorb_search_error(&mut self, error: AppError) -> Result<()> {
        if !error.is_fetch_related() {
            return Err(error);
        }
        log::error!("{}: search failed: {error}", self.kind);
        let message = self.config.messages.fetch_failed.get(self.language).to_string();
        self.view.show_error(&message);

        for entry in &mut self.entries {
            entry.visible = false;
        }
        self.view.render_entries(&self.entries);
        self.view.hide_page_bar();
        Ok(())
    }
}
