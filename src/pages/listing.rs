// src/pages/listing.rs

//! Listing page runners.
//!
//! One parameterized controller serves all three collections; these
//! runners wire the per-collection profile, fetcher, and console view
//! together and execute the requested operation.

use std::sync::Arc;

use crate::controller::PaginationController;
use crate::error::Result;
use crate::models::{CollectionKind, Config, FilterState, Language};
use crate::services::CollectionFetcher;
use crate::view::ConsoleView;

fn build_controller(
    config: &Arc<Config>,
    kind: CollectionKind,
    language: Language,
    expand: bool,
) -> Result<PaginationController> {
    let fetcher = CollectionFetcher::new(Arc::clone(config), kind, language)?;
    let profile = config.collections.profile(kind);
    let mut view = ConsoleView::new(kind, profile, config.view_more.clone());
    if expand {
        view.expand_all();
    }

    Ok(PaginationController::new(
        Arc::clone(config),
        kind,
        language,
        Arc::new(fetcher),
        Box::new(view),
    ))
}

/// Render one page of a listing.
pub async fn run_list(
    config: &Arc<Config>,
    kind: CollectionKind,
    language: Language,
    page: u32,
    filter: FilterState,
    expand: bool,
) -> Result<()> {
    log::info!("Loading {kind} listing...");

    let mut controller = build_controller(config, kind, language, expand)?;
    controller.init(page, filter).await?;

    log::info!(
        "{kind}: page {}/{}, {} visible item(s)",
        controller.current_page(),
        controller.total_pages(),
        controller.visible_count()
    );
    Ok(())
}

/// Load a listing and run a keyword search against it, optionally landing
/// on a later result page.
pub async fn run_search(
    config: &Arc<Config>,
    kind: CollectionKind,
    language: Language,
    query: &str,
    page: u32,
) -> Result<()> {
    log::info!("Searching {kind} for \"{query}\"...");

    let mut controller = build_controller(config, kind, language, true)?;
    controller.init(1, FilterState::show_all()).await?;
    controller.submit_query(query).await?;

    if page > 1 {
        controller.go_to_page(page).await?;
    }

    if let Some(session) = controller.session() {
        log::info!(
            "{kind}: {} match(es) for \"{}\"",
            session.total_items,
            session.query
        );
    } else {
        log::info!("{kind}: search not executed (query too short)");
    }
    Ok(())
}
