// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{CollectionKind, Language};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Remote site settings (API base, languages)
    #[serde(default)]
    pub site: SiteConfig,

    /// Per-collection listing profiles
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// "View more" progressive disclosure settings
    #[serde(default)]
    pub view_more: ViewMoreConfig,

    /// User-facing message strings, per language
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::config(format!("{}: {e}", path.as_ref().display())))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.retry_count == 0 {
            return Err(AppError::validation("http.retry_count must be > 0"));
        }
        if self.site.base_url.trim().is_empty() {
            return Err(AppError::validation("site.base_url is empty"));
        }
        for kind in CollectionKind::ALL {
            let profile = self.collections.profile(kind);
            if profile.endpoint.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "collections.{kind}.endpoint is empty"
                )));
            }
            if profile.items_per_page == 0 {
                return Err(AppError::validation(format!(
                    "collections.{kind}.items_per_page must be > 0"
                )));
            }
            if profile.fetch_page_size == 0 {
                return Err(AppError::validation(format!(
                    "collections.{kind}.fetch_page_size must be > 0"
                )));
            }
            if profile.hard_page_ceiling == 0 {
                return Err(AppError::validation(format!(
                    "collections.{kind}.hard_page_ceiling must be > 0"
                )));
            }
        }
        if self.view_more.max_visible_items == 0 {
            return Err(AppError::validation("view_more.max_visible_items must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Attempts per request before giving up
    #[serde(default = "defaults::retry_count")]
    pub retry_count: u32,

    /// Base delay between retries in milliseconds (grows linearly per attempt)
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            retry_count: defaults::retry_count(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Remote site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Collection API base, e.g. "https://cms.example.com/wp-json/wp/v2"
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Primary language code (unprefixed paths)
    #[serde(default = "defaults::primary_lang")]
    pub primary_lang: String,

    /// Secondary language code (prefixed paths)
    #[serde(default = "defaults::secondary_lang")]
    pub secondary_lang: String,

    /// Substrings marking a thumbnail URL as a placeholder
    #[serde(default = "defaults::placeholder_markers")]
    pub placeholder_markers: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            primary_lang: defaults::primary_lang(),
            secondary_lang: defaults::secondary_lang(),
            placeholder_markers: defaults::placeholder_markers(),
        }
    }
}

impl SiteConfig {
    /// Language code sent as the `lang` query parameter.
    pub fn lang_code(&self, language: Language) -> &str {
        match language {
            Language::Primary => &self.primary_lang,
            Language::Secondary => &self.secondary_lang,
        }
    }

    /// Resolve a language code back to a [`Language`]; unknown codes fall
    /// back to the primary language.
    pub fn language_for_code(&self, code: &str) -> Language {
        if code.eq_ignore_ascii_case(&self.secondary_lang) {
            Language::Secondary
        } else {
            Language::Primary
        }
    }
}

/// Sort order applied to listing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// Publication date, newest first (news)
    #[default]
    Date,
    /// Manual menu order, ascending (team, projects)
    Menu,
}

impl OrderBy {
    /// `(orderby, order)` query parameter pair.
    pub fn params(&self) -> (&'static str, &'static str) {
        match self {
            OrderBy::Date => ("date", "desc"),
            OrderBy::Menu => ("menu_order", "asc"),
        }
    }
}

/// Where keyword search executes for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchModeSetting {
    /// Paginated `search` parameter on the collection endpoint
    #[default]
    Server,
    /// In-memory deep scan over the fetched corpus
    Client,
}

/// Listing profile for one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionProfile {
    /// Endpoint path under the API base
    pub endpoint: String,

    /// Key under the record's taxonomy map holding category terms
    pub taxonomy_key: String,

    /// Pinned pickup prefix excluded from numbered pages
    #[serde(default)]
    pub skip_count: u32,

    /// Numbered-page size
    #[serde(default = "defaults::items_per_page")]
    pub items_per_page: u32,

    /// Page size used when accumulating the whole collection
    #[serde(default = "defaults::fetch_page_size")]
    pub fetch_page_size: u32,

    /// Safety valve against upstreams that never signal exhaustion
    #[serde(default = "defaults::hard_page_ceiling")]
    pub hard_page_ceiling: u32,

    /// Listing sort order
    #[serde(default)]
    pub order_by: OrderBy,

    /// Ordered custom-field names probed for the thumbnail
    #[serde(default)]
    pub thumbnail_fields: Vec<String>,

    /// Keyword search execution mode
    #[serde(default)]
    pub search: SearchModeSetting,
}

/// Profiles for the three collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    #[serde(default = "defaults::news_profile")]
    pub news: CollectionProfile,

    #[serde(default = "defaults::team_profile")]
    pub team: CollectionProfile,

    #[serde(default = "defaults::projects_profile")]
    pub projects: CollectionProfile,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            news: defaults::news_profile(),
            team: defaults::team_profile(),
            projects: defaults::projects_profile(),
        }
    }
}

impl CollectionsConfig {
    /// Profile for a collection kind.
    pub fn profile(&self, kind: CollectionKind) -> &CollectionProfile {
        match kind {
            CollectionKind::News => &self.news,
            CollectionKind::Team => &self.team,
            CollectionKind::Projects => &self.projects,
        }
    }
}

/// "View more" progressive disclosure settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewMoreConfig {
    /// Items shown while collapsed
    #[serde(default = "defaults::max_visible_items")]
    pub max_visible_items: usize,

    /// Row height used for collapsed-height estimation
    #[serde(default = "defaults::item_height_px")]
    pub item_height_px: u32,

    /// Extra offset added below the last visible row
    #[serde(default = "defaults::collapsed_offset_px")]
    pub collapsed_offset_px: u32,
}

impl Default for ViewMoreConfig {
    fn default() -> Self {
        Self {
            max_visible_items: defaults::max_visible_items(),
            item_height_px: defaults::item_height_px(),
            collapsed_offset_px: defaults::collapsed_offset_px(),
        }
    }
}

/// A user-facing string in both site languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Localized {
    pub primary: String,
    pub secondary: String,
}

impl Localized {
    fn new(primary: &str, secondary: &str) -> Self {
        Self {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
        }
    }

    /// Pick the string for a language.
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Primary => &self.primary,
            Language::Secondary => &self.secondary,
        }
    }
}

/// User-facing message strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Shown inline when a collection fetch fails
    #[serde(default = "defaults::fetch_failed")]
    pub fetch_failed: Localized,

    /// Shown when a search produced no matches
    #[serde(default = "defaults::no_results")]
    pub no_results: Localized,

    /// Search summary; `{query}` and `{count}` are substituted
    #[serde(default = "defaults::results_for")]
    pub results_for: Localized,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            fetch_failed: defaults::fetch_failed(),
            no_results: defaults::no_results(),
            results_for: defaults::results_for(),
        }
    }
}

mod defaults {
    use super::{CollectionProfile, Localized, OrderBy, SearchModeSetting};

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; folio/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn retry_count() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        1000
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://cms.example.com/wp-json/wp/v2".into()
    }
    pub fn primary_lang() -> String {
        "ja".into()
    }
    pub fn secondary_lang() -> String {
        "en".into()
    }
    pub fn placeholder_markers() -> Vec<String> {
        vec!["default.png".into(), "noimage".into()]
    }

    // Collection defaults
    pub fn items_per_page() -> u32 {
        14
    }
    pub fn fetch_page_size() -> u32 {
        50
    }
    pub fn hard_page_ceiling() -> u32 {
        20
    }

    pub fn news_profile() -> CollectionProfile {
        CollectionProfile {
            endpoint: "news".into(),
            taxonomy_key: "news".into(),
            skip_count: 3,
            items_per_page: 14,
            fetch_page_size: 50,
            hard_page_ceiling: hard_page_ceiling(),
            order_by: OrderBy::Date,
            thumbnail_fields: vec!["news_mv".into()],
            search: SearchModeSetting::Server,
        }
    }

    pub fn team_profile() -> CollectionProfile {
        CollectionProfile {
            endpoint: "team".into(),
            taxonomy_key: "position".into(),
            skip_count: 0,
            items_per_page: 50,
            fetch_page_size: 50,
            hard_page_ceiling: hard_page_ceiling(),
            order_by: OrderBy::Menu,
            thumbnail_fields: vec!["thumbnail".into(), "image".into()],
            search: SearchModeSetting::Client,
        }
    }

    pub fn projects_profile() -> CollectionProfile {
        CollectionProfile {
            endpoint: "projects".into(),
            taxonomy_key: "projects".into(),
            skip_count: 0,
            items_per_page: 100,
            fetch_page_size: 100,
            hard_page_ceiling: hard_page_ceiling(),
            order_by: OrderBy::Menu,
            thumbnail_fields: vec!["thumbnail.image".into()],
            search: SearchModeSetting::Client,
        }
    }

    // View-more defaults
    pub fn max_visible_items() -> usize {
        10
    }
    pub fn item_height_px() -> u32 {
        96
    }
    pub fn collapsed_offset_px() -> u32 {
        150
    }

    // Message defaults
    pub fn fetch_failed() -> Localized {
        Localized::new(
            "コンテンツの取得に失敗しました。しばらく後に再度お試しください。",
            "Failed to load content. Please try again later.",
        )
    }
    pub fn no_results() -> Localized {
        Localized::new("該当する結果が見つかりませんでした。", "No matching results found.")
    }
    pub fn results_for() -> Localized {
        Localized::new(
            "「{query}」の検索結果 ({count}件)",
            "Search results for \"{query}\" ({count})",
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.collections.news.items_per_page = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_partial_toml_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[site]\nbase_url = \"https://example.org/wp-json/wp/v2\"\n\n\
             [collections.news]\nendpoint = \"news\"\ntaxonomy_key = \"news\"\nskip_count = 4"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.site.base_url, "https://example.org/wp-json/wp/v2");
        assert_eq!(config.collections.news.skip_count, 4);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.http.retry_count, 3);
        assert_eq!(config.collections.projects.endpoint, "projects");
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = Config::load_or_default("definitely/not/here.toml");
        assert_eq!(config.collections.news.skip_count, 3);
    }

    #[test]
    fn language_round_trip() {
        let site = SiteConfig::default();
        assert_eq!(site.lang_code(Language::Primary), "ja");
        assert_eq!(site.language_for_code("en"), Language::Secondary);
        assert_eq!(site.language_for_code("fr"), Language::Primary);
    }
}
