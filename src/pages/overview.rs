// src/pages/overview.rs

//! Collection overview probe.
//!
//! Fetches the first page of every configured collection concurrently and
//! reports per-collection totals. A failing collection is reported and
//! skipped; the probe itself keeps going.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{CollectionKind, Config, Language, PageQuery};
use crate::services::CollectionFetcher;

/// Probe concurrency; there are only three collections.
const PROBE_CONCURRENCY: usize = 3;

/// Summary of an overview run.
#[derive(Debug, Default)]
pub struct OverviewOutcome {
    pub probed: usize,
    pub failures: usize,
}

/// Probe all collections and log their totals.
pub async fn run_overview(config: &Arc<Config>, language: Language) -> Result<OverviewOutcome> {
    log::info!("Probing {} collection(s)...", CollectionKind::ALL.len());

    let mut outcome = OverviewOutcome::default();

    let mut probes = stream::iter(CollectionKind::ALL)
        .map(|kind| {
            let config = Arc::clone(config);
            async move {
                let result = probe_collection(config, kind, language).await;
                (kind, result)
            }
        })
        .buffer_unordered(PROBE_CONCURRENCY);

    while let Some((kind, result)) = probes.next().await {
        outcome.probed += 1;
        match result {
            Ok((sampled, total)) => {
                println!("{kind:>10}: {total} item(s), sampled {sampled}");
            }
            Err(error) => {
                outcome.failures += 1;
                log::warn!("Failed to probe {kind}: {error}");
            }
        }
    }

    if outcome.failures == 0 {
        log::info!("Overview complete.");
    } else {
        log::warn!("Overview complete with {} failure(s).", outcome.failures);
    }
    Ok(outcome)
}

async fn probe_collection(
    config: Arc<Config>,
    kind: CollectionKind,
    language: Language,
) -> Result<(usize, u64)> {
    let per_page = config.collections.profile(kind).items_per_page;
    let fetcher = CollectionFetcher::new(config, kind, language)?;
    let page = fetcher.fetch_page(&PageQuery::numbered(1, per_page)).await?;
    Ok((page.items.len(), page.total_items))
}
