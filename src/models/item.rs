// src/models/item.rs

//! Canonical collection record.
//!
//! Every collection (news, team, projects) normalizes into this shape; the
//! raw upstream variations stay behind the normalization boundary in
//! [`crate::models::raw`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CollectionKind, SiteConfig};

/// Site language a record (and every link built from it) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Primary,
    Secondary,
}

/// A taxonomy term attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    pub slug: String,
}

/// Responsive thumbnail triple. All three URLs are resolved and
/// non-placeholder; records that cannot satisfy that are dropped during
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub fallback_url: String,
    pub medium_url: String,
    pub large_url: String,
}

/// Sortable listing key: publication date for news, manual order for
/// team and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Date(DateTime<Utc>),
    Order(i64),
}

/// Canonical normalized record for any collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    /// Stable, unique within a collection
    pub id: u64,

    /// Plain-text title (rendered wrappers flattened, markup stripped)
    pub title: String,

    /// Detail-URL slug; generated from title+id when absent upstream
    pub slug: String,

    /// Listing sort key
    pub sort_key: SortKey,

    /// Category terms (used for category filtering)
    pub categories: Vec<Term>,

    /// Tag terms (independent filter dimension from categories)
    pub tags: Vec<Term>,

    /// Excluded from default listing views unless explicitly requested
    pub archived: bool,

    /// Language scope
    pub language: Language,

    /// Responsive image triple
    pub thumbnail: Thumbnail,

    /// Plain-text summary (deep-search field)
    pub outline: String,

    /// Flattened key-value facts (deep-search field)
    pub basics: Vec<(String, String)>,

    /// Credited member names (deep-search field)
    pub credits: Vec<String>,
}

impl CollectionItem {
    /// Category slugs, lowercased.
    pub fn category_slugs(&self) -> impl Iterator<Item = String> + '_ {
        self.categories.iter().map(|t| t.slug.to_lowercase())
    }

    /// Tag slugs, lowercased.
    pub fn tag_slugs(&self) -> impl Iterator<Item = String> + '_ {
        self.tags.iter().map(|t| t.slug.to_lowercase())
    }

    /// Case-insensitive category membership.
    pub fn has_category(&self, slug: &str) -> bool {
        self.categories
            .iter()
            .any(|t| t.slug.eq_ignore_ascii_case(slug))
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|t| t.slug.eq_ignore_ascii_case(slug))
    }

    /// Language-scoped detail URL, e.g. `/projects/acme/` or
    /// `/en/projects/acme/`.
    pub fn detail_url(&self, kind: CollectionKind, site: &SiteConfig) -> String {
        match self.language {
            Language::Primary => format!("/{}/{}/", kind.as_str(), self.slug),
            Language::Secondary => {
                format!("/{}/{}/{}/", site.secondary_lang, kind.as_str(), self.slug)
            }
        }
    }

    /// Short sort-key label for console listings.
    pub fn sort_label(&self) -> String {
        match self.sort_key {
            SortKey::Date(date) => date.format("%Y.%m.%d").to_string(),
            SortKey::Order(order) => format!("#{order}"),
        }
    }
}

/// Sort a normalized set into listing order: date descending for dated
/// records, manual order ascending otherwise. Stable so upstream order is
/// kept among equals.
pub fn sort_for_listing(items: &mut [CollectionItem]) {
    items.sort_by(|a, b| match (&a.sort_key, &b.sort_key) {
        (SortKey::Date(da), SortKey::Date(db)) => db.cmp(da),
        (SortKey::Order(oa), SortKey::Order(ob)) => oa.cmp(ob),
        // Mixed keys only happen on malformed upstream data; dated records
        // list first.
        (SortKey::Date(_), SortKey::Order(_)) => std::cmp::Ordering::Less,
        (SortKey::Order(_), SortKey::Date(_)) => std::cmp::Ordering::Greater,
    });
}

/// Test helpers shared across the crate's unit tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn sample_item(id: u64) -> CollectionItem {
        CollectionItem {
            id,
            title: format!("Item {id}"),
            slug: format!("item-{id}"),
            sort_key: SortKey::Order(id as i64),
            categories: vec![Term {
                name: "Branding".to_string(),
                slug: "branding".to_string(),
            }],
            tags: vec![],
            archived: false,
            language: Language::Primary,
            thumbnail: Thumbnail {
                fallback_url: "https://img.example.com/a.jpg".to_string(),
                medium_url: "https://img.example.com/a-m.jpg".to_string(),
                large_url: "https://img.example.com/a-l.jpg".to_string(),
            },
            outline: String::new(),
            basics: vec![],
            credits: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::fixtures::sample_item;
    use super::*;

    #[test]
    fn test_membership_is_case_insensitive() {
        let item = sample_item(1);
        assert!(item.has_category("BRANDING"));
        assert!(!item.has_category("design"));
        assert!(!item.has_tag("branding"));
    }

    #[test]
    fn test_detail_url_is_language_scoped() {
        let site = SiteConfig::default();
        let mut item = sample_item(2);
        assert_eq!(
            item.detail_url(CollectionKind::Projects, &site),
            "/projects/item-2/"
        );

        item.language = Language::Secondary;
        assert_eq!(
            item.detail_url(CollectionKind::Projects, &site),
            "/en/projects/item-2/"
        );
    }

    #[test]
    fn test_sort_for_listing_dates_descend() {
        let day = |d: u32| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        let mut items: Vec<CollectionItem> = (1..=3)
            .map(|i| {
                let mut item = sample_item(i);
                item.sort_key = SortKey::Date(day(i as u32));
                item
            })
            .collect();

        sort_for_listing(&mut items);
        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_sort_for_listing_orders_ascend() {
        let mut items = vec![sample_item(9), sample_item(2), sample_item(5)];
        sort_for_listing(&mut items);
        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
