// src/utils/url.rs

//! URL construction for collection requests and canonical listing
//! locations.

use url::Url;
use url::form_urlencoded::Serializer;

use crate::error::Result;
use crate::models::{CollectionKind, CollectionProfile, FilterState, Language, PageQuery, SiteConfig};

/// Build the request URL for one collection-endpoint page.
///
/// When `offset` is present it replaces the `page` parameter; the API
/// treats the two as alternative windowing mechanisms.
pub fn collection_url(
    site: &SiteConfig,
    profile: &CollectionProfile,
    language: Language,
    query: &PageQuery,
) -> Result<Url> {
    let base = format!(
        "{}/{}",
        site.base_url.trim_end_matches('/'),
        profile.endpoint.trim_matches('/')
    );
    let mut url = Url::parse(&base)?;

    {
        let (orderby, order) = profile.order_by.params();
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("lang", site.lang_code(language));
        pairs.append_pair("per_page", &query.per_page.to_string());
        match query.offset {
            Some(offset) => {
                pairs.append_pair("offset", &offset.to_string());
            }
            None => {
                pairs.append_pair("page", &query.page.to_string());
            }
        }
        if let Some(search) = query.search.as_deref() {
            pairs.append_pair("search", search);
        }
        pairs.append_pair("orderby", orderby);
        pairs.append_pair("order", order);
    }

    Ok(url)
}

/// Language-scoped listing path, e.g. `/news/` or `/en/news/`.
pub fn listing_path(kind: CollectionKind, language: Language, site: &SiteConfig) -> String {
    match language {
        Language::Primary => format!("/{}/", kind.as_str()),
        Language::Secondary => format!("/{}/{}/", site.secondary_lang, kind.as_str()),
    }
}

/// Canonical listing query string reflecting filter, search, and page
/// state. The `page` parameter is omitted on page 1 to keep canonical URLs
/// clean; filter dimensions encode by precedence, one at a time.
pub fn listing_query(filter: &FilterState, search: Option<&str>, page: u32) -> String {
    let mut serializer = Serializer::new(String::new());

    if filter.archived {
        serializer.append_pair("archived", "true");
    } else if let Some(tag) = filter.tag.as_deref() {
        serializer.append_pair("tag", tag);
    } else if let Some(category) = filter.category.as_deref() {
        serializer.append_pair("category", category);
    }

    if let Some(search) = search {
        serializer.append_pair("search", search);
    }

    if page > 1 {
        serializer.append_pair("page", &page.to_string());
    }

    let encoded = serializer.finish();
    if encoded.is_empty() {
        String::new()
    } else {
        format!("?{encoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CollectionsConfig;

    fn site() -> SiteConfig {
        SiteConfig::default()
    }

    #[test]
    fn test_collection_url_numbered_page() {
        let profile = CollectionsConfig::default().news;
        let url = collection_url(
            &site(),
            &profile,
            Language::Primary,
            &PageQuery::numbered(2, 50),
        )
        .unwrap();

        let query = url.query().unwrap();
        assert!(query.contains("lang=ja"));
        assert!(query.contains("per_page=50"));
        assert!(query.contains("page=2"));
        assert!(query.contains("orderby=date"));
        assert!(query.contains("order=desc"));
        assert!(!query.contains("offset="));
    }

    #[test]
    fn test_collection_url_offset_replaces_page() {
        let profile = CollectionsConfig::default().news;
        let url = collection_url(
            &site(),
            &profile,
            Language::Secondary,
            &PageQuery::windowed(32, 14),
        )
        .unwrap();

        let query = url.query().unwrap();
        assert!(query.contains("offset=32"));
        assert!(query.contains("lang=en"));
        assert!(!query.contains("page="));
    }

    #[test]
    fn test_collection_url_search_parameter() {
        let profile = CollectionsConfig::default().news;
        let url = collection_url(
            &site(),
            &profile,
            Language::Primary,
            &PageQuery::searching("tokyo office", 1, 14),
        )
        .unwrap();
        assert!(url.query().unwrap().contains("search=tokyo+office"));
    }

    #[test]
    fn test_listing_query_omits_page_one() {
        assert_eq!(listing_query(&FilterState::show_all(), None, 1), "");
        assert_eq!(listing_query(&FilterState::show_all(), None, 3), "?page=3");
    }

    #[test]
    fn test_listing_query_single_filter_by_precedence() {
        let filter = FilterState {
            archived: true,
            tag: Some("branding".into()),
            category: Some("web".into()),
        };
        assert_eq!(listing_query(&filter, None, 1), "?archived=true");

        let filter = FilterState {
            archived: false,
            tag: Some("branding".into()),
            category: Some("web".into()),
        };
        assert_eq!(listing_query(&filter, None, 1), "?tag=branding");
    }

    #[test]
    fn test_listing_path_language_prefix() {
        assert_eq!(
            listing_path(CollectionKind::News, Language::Primary, &site()),
            "/news/"
        );
        assert_eq!(
            listing_path(CollectionKind::Team, Language::Secondary, &site()),
            "/en/team/"
        );
    }
}
