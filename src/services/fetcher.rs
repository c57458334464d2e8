// src/services/fetcher.rs

//! Collection fetcher service.
//!
//! Performs paged GET requests against one collection endpoint, retries
//! transient failures, and normalizes the heterogeneous upstream records
//! into [`CollectionItem`]s at the response boundary.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{
    CollectionItem, CollectionKind, Config, Language, PageQuery, RawItem, sort_for_listing,
};
use crate::services::source::{CollectionSource, FetchedPage};
use crate::utils::url::collection_url;

/// Service fetching one collection in one language.
pub struct CollectionFetcher {
    config: Arc<Config>,
    kind: CollectionKind,
    language: Language,
    client: Client,
}

impl CollectionFetcher {
    /// Create a fetcher with a configured HTTP client.
    pub fn new(config: Arc<Config>, kind: CollectionKind, language: Language) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            kind,
            language,
            client,
        })
    }

    /// Fetch one page of the collection plus upstream totals.
    ///
    /// Totals come from the `X-WP-Total` / `X-WP-TotalPages` response
    /// headers, parsed defensively: when absent or malformed they are
    /// derived from the returned body instead.
    pub async fn fetch_page(&self, query: &PageQuery) -> Result<FetchedPage> {
        let profile = self.config.collections.profile(self.kind);
        let url = collection_url(&self.config.site, profile, self.language, query)?;

        let (payload, headers) = self.get_with_retry(url.as_str()).await?;
        let raw_items = decode_item_array(payload, self.kind)?;
        let fetched_count = raw_items.len() as u64;

        let items = self.normalize_batch(raw_items);

        let total_items = header_u64(&headers, "x-wp-total")
            .unwrap_or_else(|| query.offset.unwrap_or(0) + fetched_count);
        let total_pages = header_u64(&headers, "x-wp-totalpages")
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or_else(|| div_ceil_pages(total_items, query.per_page));

        Ok(FetchedPage {
            items,
            total_items,
            total_pages,
        })
    }

    /// Fetch the whole collection, page by page, until the upstream signals
    /// exhaustion (short or empty page) or the hard page ceiling trips.
    ///
    /// Any failed page aborts the whole fetch; partial results are never
    /// returned silently.
    pub async fn fetch_all(&self) -> Result<Vec<CollectionItem>> {
        let profile = self.config.collections.profile(self.kind);
        let per_page = profile.fetch_page_size;
        let ceiling = profile.hard_page_ceiling;

        let mut collected = Vec::new();
        let mut page = 1u32;

        loop {
            let query = PageQuery::numbered(page, per_page);
            let url = collection_url(&self.config.site, profile, self.language, &query)?;
            let (payload, _headers) = self.get_with_retry(url.as_str()).await?;
            let raw_items = decode_item_array(payload, self.kind)?;

            let fetched = raw_items.len() as u32;
            collected.extend(self.normalize_batch(raw_items));

            if fetched == 0 {
                break;
            }
            if fetched < per_page {
                // Short page: last page reached.
                break;
            }
            if page >= ceiling {
                log::warn!(
                    "{}: page ceiling ({ceiling}) reached before exhaustion; truncating",
                    self.kind
                );
                break;
            }
            page += 1;
        }

        sort_for_listing(&mut collected);
        log::debug!("{}: accumulated {} records", self.kind, collected.len());
        Ok(collected)
    }

    fn normalize_batch(&self, raw_items: Vec<RawItem>) -> Vec<CollectionItem> {
        let profile = self.config.collections.profile(self.kind);
        let before = raw_items.len();

        let items: Vec<CollectionItem> = raw_items
            .into_iter()
            .filter_map(|raw| raw.normalize(profile, &self.config.site, self.language))
            .collect();

        let dropped = before - items.len();
        if dropped > 0 {
            log::debug!("{}: dropped {dropped} partially-populated record(s)", self.kind);
        }
        items
    }

    async fn get_with_retry(&self, url: &str) -> Result<(Value, HeaderMap)> {
        with_retry(
            self.config.http.retry_count,
            self.config.http.retry_delay_ms,
            || self.get_once(url),
        )
        .await
    }

    async fn get_once(&self, url: &str) -> Result<(Value, HeaderMap)> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(
                self.kind.as_str(),
                format!("HTTP {status} from {url}"),
            ));
        }

        let headers = response.headers().clone();
        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)?;
        Ok((payload, headers))
    }
}

#[async_trait]
impl CollectionSource for CollectionFetcher {
    async fn page(&self, query: &PageQuery) -> Result<FetchedPage> {
        self.fetch_page(query).await
    }

    async fn all(&self) -> Result<Vec<CollectionItem>> {
        self.fetch_all().await
    }
}

/// Run an operation up to `attempts` times with a linearly growing delay
/// between tries. Exhausted retries surface the last error.
async fn with_retry<T, F, Fut>(attempts: u32, base_delay_ms: u64, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut last_error = AppError::fetch("retry", "no attempt made");

    for attempt in 1..=attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                log::debug!("attempt {attempt}/{attempts} failed: {error}");
                last_error = error;
            }
        }

        if attempt < attempts {
            tokio::time::sleep(backoff_delay(base_delay_ms, attempt)).await;
        }
    }

    Err(last_error)
}

/// A collection endpoint answers with a JSON array; anything else is a
/// fetch error, not an empty result.
fn decode_item_array(payload: Value, kind: CollectionKind) -> Result<Vec<RawItem>> {
    if !payload.is_array() {
        return Err(AppError::fetch(
            kind.as_str(),
            "expected a JSON array response",
        ));
    }
    Ok(serde_json::from_value(payload)?)
}

/// Parse a numeric header, tolerating absence and garbage.
fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn div_ceil_pages(total_items: u64, per_page: u32) -> u32 {
    let per_page = per_page.max(1) as u64;
    (total_items.div_ceil(per_page)).clamp(1, u32::MAX as u64) as u32
}

fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(attempt as u64))
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_header_parsing_is_defensive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-wp-total", HeaderValue::from_static("42"));
        headers.insert("x-wp-totalpages", HeaderValue::from_static("garbage"));

        assert_eq!(header_u64(&headers, "x-wp-total"), Some(42));
        assert_eq!(header_u64(&headers, "x-wp-totalpages"), None);
        assert_eq!(header_u64(&headers, "x-missing"), None);
    }

    #[test]
    fn test_non_array_payload_is_a_fetch_error() {
        let payload = json!({ "message": "maintenance" });
        let result = decode_item_array(payload, CollectionKind::News);
        assert!(matches!(result, Err(AppError::Fetch { .. })));
    }

    #[test]
    fn test_array_payload_decodes() {
        let payload = json!([{ "id": 1 }, { "id": 2 }]);
        let items = decode_item_array(payload, CollectionKind::News).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, Some(2));
    }

    #[test]
    fn test_derived_total_pages_floors_at_one() {
        assert_eq!(div_ceil_pages(0, 14), 1);
        assert_eq!(div_ceil_pages(14, 14), 1);
        assert_eq!(div_ceil_pages(15, 14), 2);
    }

    #[test]
    fn test_backoff_grows_linearly() {
        assert_eq!(backoff_delay(1000, 1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1000, 2), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_retry_stops_after_configured_attempts() {
        let calls = std::cell::Cell::new(0u32);
        let result: Result<()> = with_retry(3, 0, || {
            calls.set(calls.get() + 1);
            async { Err(AppError::fetch("test", "always fails")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_first_success() {
        let calls = std::cell::Cell::new(0u32);
        let result = with_retry(3, 0, || {
            calls.set(calls.get() + 1);
            let succeed = calls.get() >= 2;
            async move {
                if succeed {
                    Ok("ok")
                } else {
                    Err(AppError::fetch("test", "transient"))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.get(), 2);
    }
}
