// src/services/source.rs

//! Abstraction over a remote collection.
//!
//! The controller and search engine talk to this trait instead of the HTTP
//! fetcher directly, so tests can drive them with in-memory sources.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CollectionItem, PageQuery};

/// One fetched page of normalized records plus upstream pagination totals.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub items: Vec<CollectionItem>,
    /// Upstream total across all pages (not just this one)
    pub total_items: u64,
    pub total_pages: u32,
}

/// A paginated, searchable remote collection.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Fetch one page in listing order.
    async fn page(&self, query: &PageQuery) -> Result<FetchedPage>;

    /// Fetch the whole collection, accumulating pages until exhaustion.
    async fn all(&self) -> Result<Vec<CollectionItem>>;
}
