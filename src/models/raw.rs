// src/models/raw.rs

//! Raw upstream record shapes and their normalization.
//!
//! The collection API serves heterogeneous records: titles arrive as plain
//! strings or `{rendered}` wrappers, thumbnails live under different
//! custom-field paths per collection, taxonomy terms are keyed per content
//! type. Everything here is parsed leniently (a malformed field degrades to
//! its default instead of failing the record) and flattened into
//! [`CollectionItem`] before any other component sees it.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{
    CollectionItem, CollectionProfile, Language, SiteConfig, SortKey, Term, Thumbnail,
};
use crate::utils::html;

/// Deserialize a field, falling back to `T::default()` when the upstream
/// shape does not match (the API is known to emit `false` for empty
/// object fields).
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A record as served by a collection endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<u64>,

    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<RawTitle>,

    #[serde(default, deserialize_with = "lenient")]
    pub menu_order: Option<i64>,

    /// Flat legacy thumbnail field, last resort before dropping
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail_url: Option<String>,

    /// Taxonomy terms keyed by content type (e.g. `news`, `projects`)
    #[serde(default, deserialize_with = "lenient")]
    pub taxonomy: BTreeMap<String, Vec<RawTerm>>,

    /// Custom-field block
    #[serde(default, deserialize_with = "lenient")]
    pub acfs: RawFields,
}

/// Title as either a plain string or a rendered wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTitle {
    Rendered { rendered: String },
    Plain(String),
}

impl RawTitle {
    /// Flatten to the contained string.
    pub fn flatten(&self) -> &str {
        match self {
            RawTitle::Rendered { rendered } => rendered,
            RawTitle::Plain(plain) => plain,
        }
    }
}

/// A taxonomy or tag term. Project tags nest their slug one level deeper
/// under `terms`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTerm {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default, deserialize_with = "lenient")]
    pub terms: Option<RawTermSlug>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTermSlug {
    #[serde(default)]
    pub slug: String,
}

impl RawTerm {
    /// Effective slug: nested `terms.slug`, then `slug`, then a slug
    /// derived from the name.
    pub fn resolved_slug(&self) -> String {
        if let Some(terms) = &self.terms
            && !terms.slug.is_empty()
        {
            return terms.slug.clone();
        }
        if !self.slug.is_empty() {
            return self.slug.clone();
        }
        slugify(&self.name)
    }

    fn into_term(self) -> Option<Term> {
        let slug = self.resolved_slug();
        if self.name.is_empty() && slug.is_empty() {
            return None;
        }
        let name = if self.name.is_empty() {
            slug.clone()
        } else {
            self.name
        };
        Some(Term { name, slug })
    }
}

/// Custom-field block; only the fields the listings consume.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFields {
    #[serde(default, deserialize_with = "lenient")]
    pub news_mv: Option<RawImage>,

    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<RawThumbField>,

    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<RawImage>,

    #[serde(default, deserialize_with = "lenient")]
    pub outline: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub tags: Vec<RawTerm>,

    #[serde(default, deserialize_with = "lenient")]
    pub basics: BTreeMap<String, Value>,

    #[serde(default, deserialize_with = "lenient")]
    pub team: Vec<RawCredit>,

    #[serde(default, deserialize_with = "lenient")]
    pub is_archived: bool,

    #[serde(default, deserialize_with = "lenient")]
    pub position: Option<String>,

    #[serde(default, rename = "position-tag", deserialize_with = "lenient")]
    pub position_tag: Vec<RawTerm>,
}

/// An uploaded image with optional size variants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub sizes: BTreeMap<String, Value>,
}

/// Thumbnail custom field; either an image itself or a wrapper around one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThumbField {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub sizes: BTreeMap<String, Value>,

    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<RawImage>,
}

/// A credited team member reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCredit {
    #[serde(default)]
    pub post_title: String,
}

/// Borrowed view of one candidate image source.
struct ImageSource<'a> {
    url: Option<&'a str>,
    sizes: &'a BTreeMap<String, Value>,
}

impl<'a> ImageSource<'a> {
    fn size(&self, key: &str) -> Option<&'a str> {
        self.sizes
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    fn generic(&self) -> Option<&'a str> {
        self.url.filter(|s| !s.is_empty())
    }

    /// Resolve the responsive triple: sized URL first, generic URL as the
    /// fallback for each slot. Placeholder URLs do not count as resolved.
    fn resolve(&self, placeholder_markers: &[String]) -> Option<Thumbnail> {
        let fallback = self.size("thumbnail").or_else(|| self.generic())?;
        let medium = self
            .size("medium")
            .or_else(|| self.size("medium_large"))
            .or_else(|| self.generic())?;
        let large = self
            .size("large")
            .or_else(|| self.size("medium_large"))
            .or_else(|| self.generic())?;

        for candidate in [fallback, medium, large] {
            if is_placeholder(candidate, placeholder_markers) {
                return None;
            }
        }

        Some(Thumbnail {
            fallback_url: fallback.to_string(),
            medium_url: medium.to_string(),
            large_url: large.to_string(),
        })
    }
}

fn is_placeholder(url: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| !m.is_empty() && url.contains(m))
}

impl RawItem {
    /// Normalize into the canonical record.
    ///
    /// Returns `None` (record dropped) when `id`, a non-empty title, or a
    /// fully resolved thumbnail is missing; partially-populated upstream
    /// records must never reach the render stage.
    pub fn normalize(
        self,
        profile: &CollectionProfile,
        site: &SiteConfig,
        language: Language,
    ) -> Option<CollectionItem> {
        let id = self.id?;

        let title = html::strip_tags(self.title.as_ref().map(RawTitle::flatten).unwrap_or(""));
        if title.is_empty() {
            return None;
        }

        let slug = match self.slug.as_deref() {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_string(),
            _ => generated_slug(&title, id, &profile.endpoint),
        };

        let thumbnail = self.resolve_thumbnail(profile, site)?;

        let sort_key = match profile.order_by {
            crate::models::OrderBy::Date => SortKey::Date(
                self.date
                    .as_deref()
                    .and_then(parse_date)
                    .unwrap_or(DateTime::UNIX_EPOCH),
            ),
            crate::models::OrderBy::Menu => SortKey::Order(self.menu_order.unwrap_or(0)),
        };

        let mut categories: Vec<Term> = self
            .taxonomy
            .get(&profile.taxonomy_key)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawTerm::into_term)
            .collect();
        // A single role string doubles as a category term (team listings
        // filter by role).
        if let Some(position) = self.acfs.position.as_deref().filter(|p| !p.is_empty()) {
            categories.push(Term {
                name: position.to_string(),
                slug: slugify(position),
            });
        }

        let tags: Vec<Term> = self
            .acfs
            .tags
            .iter()
            .chain(self.acfs.position_tag.iter())
            .cloned()
            .filter_map(RawTerm::into_term)
            .collect();

        let outline = self
            .acfs
            .outline
            .as_deref()
            .map(html::strip_tags)
            .unwrap_or_default();

        let basics: Vec<(String, String)> = self
            .acfs
            .basics
            .iter()
            .filter_map(|(key, value)| scalar_string(value).map(|v| (key.clone(), v)))
            .collect();

        let credits: Vec<String> = self
            .acfs
            .team
            .iter()
            .map(|credit| credit.post_title.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        Some(CollectionItem {
            id,
            title,
            slug,
            sort_key,
            categories,
            tags,
            archived: self.acfs.is_archived,
            language,
            thumbnail,
            outline,
            basics,
            credits,
        })
    }

    /// Walk the profile's candidate fields, then the flat legacy field.
    fn resolve_thumbnail(&self, profile: &CollectionProfile, site: &SiteConfig) -> Option<Thumbnail> {
        for field in &profile.thumbnail_fields {
            if let Some(source) = self.image_source(field)
                && let Some(thumbnail) = source.resolve(&site.placeholder_markers)
            {
                return Some(thumbnail);
            }
        }

        let legacy = self.thumbnail_url.as_deref().filter(|url| !url.is_empty())?;
        if is_placeholder(legacy, &site.placeholder_markers) {
            return None;
        }
        Some(Thumbnail {
            fallback_url: legacy.to_string(),
            medium_url: legacy.to_string(),
            large_url: legacy.to_string(),
        })
    }

    fn image_source(&self, field: &str) -> Option<ImageSource<'_>> {
        match field {
            "news_mv" => self.acfs.news_mv.as_ref().map(|img| ImageSource {
                url: img.url.as_deref(),
                sizes: &img.sizes,
            }),
            "thumbnail" => self.acfs.thumbnail.as_ref().map(|thumb| ImageSource {
                url: thumb.url.as_deref(),
                sizes: &thumb.sizes,
            }),
            "thumbnail.image" => self
                .acfs
                .thumbnail
                .as_ref()
                .and_then(|thumb| thumb.image.as_ref())
                .map(|img| ImageSource {
                    url: img.url.as_deref(),
                    sizes: &img.sizes,
                }),
            "image" => self.acfs.image.as_ref().map(|img| ImageSource {
                url: img.url.as_deref(),
                sizes: &img.sizes,
            }),
            other => {
                log::debug!("Unknown thumbnail field in profile: {other}");
                None
            }
        }
    }
}

/// Deterministic slug from title and id, used when upstream omits one.
fn generated_slug(title: &str, id: u64, endpoint: &str) -> String {
    let cleaned = slugify(title);
    if cleaned.is_empty() {
        format!("{endpoint}-{id}")
    } else {
        format!("{cleaned}-{id}")
    }
}

fn slugify(text: &str) -> String {
    static NON_SLUG: OnceLock<Regex> = OnceLock::new();
    let re = NON_SLUG.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static pattern"));
    re.replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Publication dates arrive in a couple of formats; an unparseable date is
/// not worth failing a record over.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{CollectionsConfig, OrderBy};

    fn news_profile() -> CollectionProfile {
        CollectionsConfig::default().news.clone()
    }

    fn site() -> SiteConfig {
        SiteConfig::default()
    }

    fn raw_news(id: u64, with_image: bool) -> Value {
        let mut item = json!({
            "id": id,
            "date": "2024-03-01T10:00:00",
            "slug": format!("article-{id}"),
            "title": { "rendered": format!("Article {id}") },
            "taxonomy": { "news": [ { "name": "Culture", "slug": "culture" } ] },
            "acfs": {}
        });
        if with_image {
            item["acfs"]["news_mv"] = json!({
                "url": "https://img.example.com/full.jpg",
                "sizes": {
                    "thumbnail": "https://img.example.com/t.jpg",
                    "medium": "https://img.example.com/m.jpg",
                    "large": "https://img.example.com/l.jpg"
                }
            });
        }
        item
    }

    #[test]
    fn test_title_flattens_both_shapes() {
        let rendered: RawTitle = serde_json::from_value(json!({ "rendered": "<em>Hi</em>" })).unwrap();
        assert_eq!(rendered.flatten(), "<em>Hi</em>");

        let plain: RawTitle = serde_json::from_value(json!("Hello")).unwrap();
        assert_eq!(plain.flatten(), "Hello");
    }

    #[test]
    fn test_normalize_strips_title_markup() {
        let mut value = raw_news(1, true);
        value["title"] = json!({ "rendered": "Opening <br>2024" });
        let item = serde_json::from_value::<RawItem>(value)
            .unwrap()
            .normalize(&news_profile(), &site(), Language::Primary)
            .unwrap();
        assert_eq!(item.title, "Opening 2024");
    }

    #[test]
    fn test_normalize_generates_slug_when_absent() {
        let mut value = raw_news(7, true);
        value["slug"] = json!(null);
        value["title"] = json!("Grand Opening!");
        let item = serde_json::from_value::<RawItem>(value)
            .unwrap()
            .normalize(&news_profile(), &site(), Language::Primary)
            .unwrap();
        assert_eq!(item.slug, "grand-opening-7");
    }

    #[test]
    fn test_normalize_drops_item_without_thumbnail() {
        // Five records, the third has no resolvable image anywhere.
        let raws: Vec<RawItem> = (1..=5)
            .map(|id| serde_json::from_value(raw_news(id, id != 3)).unwrap())
            .collect();

        let profile = news_profile();
        let normalized: Vec<_> = raws
            .into_iter()
            .filter_map(|raw| raw.normalize(&profile, &site(), Language::Primary))
            .collect();

        assert_eq!(normalized.len(), 4);
        assert!(normalized.iter().all(|item| item.id != 3));
    }

    #[test]
    fn test_thumbnail_falls_back_to_generic_url() {
        let mut value = raw_news(2, false);
        value["acfs"]["news_mv"] = json!({ "url": "https://img.example.com/only.jpg" });
        let item = serde_json::from_value::<RawItem>(value)
            .unwrap()
            .normalize(&news_profile(), &site(), Language::Primary)
            .unwrap();
        assert_eq!(item.thumbnail.medium_url, "https://img.example.com/only.jpg");
        assert_eq!(item.thumbnail.large_url, "https://img.example.com/only.jpg");
    }

    #[test]
    fn test_placeholder_thumbnail_drops_item() {
        let mut value = raw_news(4, false);
        value["acfs"]["news_mv"] = json!({ "url": "/common/images/news/default.png" });
        let dropped = serde_json::from_value::<RawItem>(value)
            .unwrap()
            .normalize(&news_profile(), &site(), Language::Primary);
        assert!(dropped.is_none());
    }

    #[test]
    fn test_legacy_flat_field_is_last_resort() {
        let mut value = raw_news(5, false);
        value["thumbnail_url"] = json!("https://img.example.com/legacy.jpg");
        let item = serde_json::from_value::<RawItem>(value)
            .unwrap()
            .normalize(&news_profile(), &site(), Language::Primary)
            .unwrap();
        assert_eq!(item.thumbnail.fallback_url, "https://img.example.com/legacy.jpg");
    }

    #[test]
    fn test_lenient_fields_tolerate_false() {
        // Empty custom-field blocks arrive as `false`.
        let mut value = raw_news(6, true);
        value["taxonomy"] = json!(false);
        let item = serde_json::from_value::<RawItem>(value)
            .unwrap()
            .normalize(&news_profile(), &site(), Language::Primary)
            .unwrap();
        assert!(item.categories.is_empty());
    }

    #[test]
    fn test_project_tag_slug_resolution() {
        let term: RawTerm =
            serde_json::from_value(json!({ "name": "Branding", "terms": { "slug": "branding" } }))
                .unwrap();
        assert_eq!(term.resolved_slug(), "branding");

        let bare: RawTerm = serde_json::from_value(json!({ "name": "Art Direction" })).unwrap();
        assert_eq!(bare.resolved_slug(), "art-direction");
    }

    #[test]
    fn test_menu_order_sort_key() {
        let mut profile = news_profile();
        profile.order_by = OrderBy::Menu;
        let mut value = raw_news(8, true);
        value["menu_order"] = json!(12);
        let item = serde_json::from_value::<RawItem>(value)
            .unwrap()
            .normalize(&profile, &site(), Language::Primary)
            .unwrap();
        assert_eq!(item.sort_key, SortKey::Order(12));
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-03-01T10:00:00").is_some());
        assert!(parse_date("2024-03-01").is_some());
        assert!(parse_date("not a date").is_none());
    }
}
