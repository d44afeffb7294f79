//! Anime torrent provider abstraction
//!
//! A provider turns a release feed into [`AnimeTorrent`] records the host can
//! list, search and filter. The transport is injected through [`FeedFetcher`]
//! so the normalization path stays free of network concerns.

mod fetch;
pub mod subsplease;
pub mod wire;

pub use fetch::{FeedFetcher, FetchResponse, HttpFeedFetcher};
pub use subsplease::SubsPleaseProvider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unified error type for provider operations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Feed request failed with status {status}")]
    FetchFailure { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode feed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Provider category reported to the host
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Main,
}

/// Smart-search dimensions a provider honors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SmartSearchFilter {
    EpisodeNumber,
    Resolution,
}

/// Capability descriptor returned to the host once at registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCapabilities {
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    pub can_smart_search: bool,
    pub smart_search_filters: Vec<SmartSearchFilter>,
    pub supports_adult: bool,
}

/// A normalized torrent record
///
/// Unknown counts, episode numbers and hashes are `None` here and are written
/// as `-1` / `""` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimeTorrent {
    pub name: String,
    #[serde(with = "wire::lenient_date")]
    pub date: DateTime<Utc>,
    /// Size in bytes, 0 when unknown
    pub size: u64,
    pub formatted_size: String,
    #[serde(with = "wire::sentinel_u32")]
    pub seeders: Option<u32>,
    #[serde(with = "wire::sentinel_u32")]
    pub leechers: Option<u32>,
    pub download_count: u32,
    /// Release page on the provider site
    pub link: String,
    pub download_url: String,
    pub magnet_link: String,
    #[serde(with = "wire::empty_string")]
    pub info_hash: Option<String>,
    pub resolution: String,
    pub is_batch: bool,
    #[serde(with = "wire::sentinel_u32")]
    pub episode_number: Option<u32>,
    pub release_group: String,
    pub is_best_release: bool,
    pub confirmed: bool,
}

/// Media descriptor supplied by the host with a smart search
///
/// Fields sent as `null` read as their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Media {
    pub romaji_title: Option<String>,
    pub english_title: Option<String>,
    #[serde(deserialize_with = "wire::null_as_default")]
    pub synonyms: Vec<String>,
    /// Added to a within-season episode number to get the absolute number,
    /// negative values count as 0
    #[serde(deserialize_with = "wire::null_as_default")]
    pub absolute_season_offset: i32,
}

impl Media {
    /// First non-empty title, preferring romaji over english over synonyms
    pub fn search_title(&self) -> Option<&str> {
        [self.romaji_title.as_deref(), self.english_title.as_deref()]
            .into_iter()
            .flatten()
            .chain(self.synonyms.iter().map(String::as_str))
            .map(str::trim)
            .find(|t| !t.is_empty())
    }
}

/// Search intent for a smart search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmartSearchOptions {
    #[serde(deserialize_with = "wire::null_as_default")]
    pub media: Media,
    #[serde(deserialize_with = "wire::null_as_default")]
    pub query: String,
    #[serde(deserialize_with = "wire::null_as_default")]
    pub batch: bool,
    /// Target episode, 0 or less means any episode
    #[serde(deserialize_with = "wire::null_as_default")]
    pub episode_number: i32,
    /// Target resolution label such as `"1080p"`, empty means any
    #[serde(deserialize_with = "wire::null_as_default")]
    pub resolution: String,
}

impl SmartSearchOptions {
    /// Resolve the query string sent to the feed
    ///
    /// An explicit query wins, otherwise the media titles are tried in order.
    pub fn effective_query(&self) -> String {
        let query = self.query.trim();
        if !query.is_empty() {
            return query.to_string();
        }

        self.media.search_title().unwrap_or_default().to_string()
    }
}

/// Operations a provider exposes to the host
#[async_trait]
pub trait AnimeProvider: Send + Sync {
    /// Capability descriptor
    fn settings(&self) -> ProviderCapabilities;

    /// Latest releases, unfiltered
    async fn get_latest(&self) -> Result<Vec<AnimeTorrent>>;

    /// Free-text search, unfiltered
    async fn search(&self, query: &str) -> Result<Vec<AnimeTorrent>>;

    /// Search and narrow the result set by episode, resolution and batch intent
    async fn smart_search(&self, options: &SmartSearchOptions) -> Result<Vec<AnimeTorrent>>;

    /// Magnet link stored on a torrent
    fn get_magnet_link(&self, torrent: &AnimeTorrent) -> String {
        torrent.magnet_link.clone()
    }
}
