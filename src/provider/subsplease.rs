//! SubsPlease release feed provider
//!
//! SubsPlease publishes one entry per episode with a magnet per resolution.
//! The API answers `GET /api/?f=search&tz=..&s=..` with a JSON object keyed by
//! release identifier, or `[]` when nothing matched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{
    AnimeProvider, AnimeTorrent, FeedFetcher, ProviderCapabilities, ProviderError, ProviderType,
    Result, SmartSearchFilter, SmartSearchOptions,
};
use crate::service::{apply_smart_filter, build_result_set, SmartFilter};

/// Release group stamped on every torrent
pub const RELEASE_GROUP: &str = "SubsPlease";

/// Episode label the feed uses for season batches
pub const BATCH_EPISODE: &str = "Batch";

/// Base for release page links
pub const SHOW_PAGE_BASE: &str = "https://subsplease.org/shows/";

/// One entry of the feed payload
#[derive(Debug, Clone, Deserialize)]
pub struct RawRelease {
    pub show: String,
    pub episode: String,
    #[serde(deserialize_with = "valid_downloads")]
    pub downloads: Vec<RawDownload>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl RawRelease {
    pub fn is_batch(&self) -> bool {
        self.episode == BATCH_EPISODE
    }
}

/// One resolution variant of a release
#[derive(Debug, Clone, Deserialize)]
pub struct RawDownload {
    /// Quality label without unit, e.g. `"1080"`
    pub res: String,
    pub magnet: String,
}

/// Keep the well-formed download variants, logging the rest
fn valid_downloads<'de, D>(deserializer: D) -> std::result::Result<Vec<RawDownload>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;

    Ok(values
        .into_iter()
        .filter_map(|value| match RawDownload::deserialize(&value) {
            Ok(download) => Some(download),
            Err(e) => {
                warn!("Skipping malformed download {}: {}", value, e);
                None
            }
        })
        .collect())
}

pub struct SubsPleaseProvider {
    fetcher: Arc<dyn FeedFetcher>,
}

impl SubsPleaseProvider {
    pub fn new(fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch one query and normalize the whole payload
    async fn fetch_torrents(&self, query: &str) -> Result<Vec<AnimeTorrent>> {
        let response = self.fetcher.fetch(query).await?;

        if !response.is_success() {
            return Err(ProviderError::FetchFailure {
                status: response.status,
            });
        }

        let payload: serde_json::Value = serde_json::from_slice(&response.body)?;
        let torrents = build_result_set(&payload, Utc::now())?;

        debug!("Query {:?} yielded {} torrents", query, torrents.len());
        Ok(torrents)
    }
}

#[async_trait]
impl AnimeProvider for SubsPleaseProvider {
    fn settings(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            provider_type: ProviderType::Main,
            can_smart_search: true,
            smart_search_filters: vec![
                SmartSearchFilter::EpisodeNumber,
                SmartSearchFilter::Resolution,
            ],
            supports_adult: false,
        }
    }

    async fn get_latest(&self) -> Result<Vec<AnimeTorrent>> {
        self.fetch_torrents("").await
    }

    async fn search(&self, query: &str) -> Result<Vec<AnimeTorrent>> {
        self.fetch_torrents(query).await
    }

    async fn smart_search(&self, options: &SmartSearchOptions) -> Result<Vec<AnimeTorrent>> {
        let query = options.effective_query();
        info!("Smart search for {:?}", query);

        let torrents = self.fetch_torrents(&query).await?;
        let filter = SmartFilter::from_options(options);

        Ok(apply_smart_filter(torrents, &filter))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::provider::{FetchResponse, Media};
    use std::sync::Mutex;

    /// Fetcher replaying a fixed response and recording queries
    pub(crate) struct StubFetcher {
        pub status: u16,
        pub body: String,
        pub queries: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub(crate) fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body: body.to_string(),
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, query: &str) -> Result<FetchResponse> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(FetchResponse {
                status: self.status,
                body: self.body.clone().into_bytes(),
            })
        }
    }

    pub(crate) const FRIEREN_FEED: &str = r#"{
        "Sousou no Frieren - 05": {
            "show": "Sousou no Frieren",
            "episode": "05",
            "downloads": [
                {"res": "720", "magnet": "magnet:?xt=urn:btih:aaaa1111&xl=734003200"},
                {"res": "1080", "magnet": "magnet:?xt=urn:btih:bbbb2222&xl=1468006400"}
            ],
            "release_date": "Fri, 06 Oct 2023 15:00:00 +0000",
            "page": "sousou-no-frieren"
        },
        "Sousou no Frieren - 17": {
            "show": "Sousou no Frieren",
            "episode": "17",
            "downloads": [
                {"res": "1080", "magnet": "magnet:?xt=urn:btih:cccc3333&xl=1468006400"}
            ],
            "release_date": "Fri, 26 Jan 2024 15:00:00 +0000",
            "page": "sousou-no-frieren"
        },
        "Sousou no Frieren (01-28)": {
            "show": "Sousou no Frieren",
            "episode": "Batch",
            "downloads": [
                {"res": "1080", "magnet": "magnet:?xt=urn:btih:dddd4444"}
            ],
            "release_date": "Fri, 22 Mar 2024 15:00:00 +0000",
            "page": "sousou-no-frieren"
        }
    }"#;

    #[tokio::test]
    async fn test_get_latest_uses_empty_query() {
        let fetcher = StubFetcher::new(200, FRIEREN_FEED);
        let provider = SubsPleaseProvider::new(fetcher.clone());

        let torrents = provider.get_latest().await.unwrap();

        assert_eq!(torrents.len(), 3);
        assert!(torrents.iter().all(|t| !t.is_batch));
        assert_eq!(*fetcher.queries.lock().unwrap(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_search_passes_query() {
        let fetcher = StubFetcher::new(200, "[]");
        let provider = SubsPleaseProvider::new(fetcher.clone());

        let torrents = provider.search("frieren").await.unwrap();

        assert!(torrents.is_empty());
        assert_eq!(*fetcher.queries.lock().unwrap(), vec!["frieren".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_failure_carries_status() {
        let provider = SubsPleaseProvider::new(StubFetcher::new(503, ""));

        let err = provider.search("frieren").await.unwrap_err();
        assert!(matches!(err, ProviderError::FetchFailure { status: 503 }));
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let provider = SubsPleaseProvider::new(StubFetcher::new(200, "<html>"));

        let err = provider.get_latest().await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn test_smart_search_filters_episode_and_resolution() {
        let fetcher = StubFetcher::new(200, FRIEREN_FEED);
        let provider = SubsPleaseProvider::new(fetcher.clone());

        let options = SmartSearchOptions {
            media: Media {
                romaji_title: Some("Sousou no Frieren".to_string()),
                absolute_season_offset: 12,
                ..Default::default()
            },
            episode_number: 5,
            resolution: "1080p".to_string(),
            ..Default::default()
        };

        let mut torrents = provider.smart_search(&options).await.unwrap();
        torrents.sort_by_key(|t| t.episode_number);

        let episodes: Vec<Option<u32>> = torrents.iter().map(|t| t.episode_number).collect();
        assert_eq!(episodes, vec![Some(5), Some(17)]);
        assert!(torrents.iter().all(|t| t.resolution == "1080p"));
        assert_eq!(
            *fetcher.queries.lock().unwrap(),
            vec!["Sousou no Frieren".to_string()]
        );
    }

    #[tokio::test]
    async fn test_smart_search_batch_is_empty() {
        let provider = SubsPleaseProvider::new(StubFetcher::new(200, FRIEREN_FEED));

        let options = SmartSearchOptions {
            query: "frieren".to_string(),
            batch: true,
            ..Default::default()
        };

        assert!(provider.smart_search(&options).await.unwrap().is_empty());
    }

    #[test]
    fn test_magnet_link_accessor() {
        let provider = SubsPleaseProvider::new(StubFetcher::new(200, "[]"));

        let torrent = AnimeTorrent {
            magnet_link: "magnet:?xt=urn:btih:ABC".to_string(),
            ..Default::default()
        };
        assert_eq!(provider.get_magnet_link(&torrent), "magnet:?xt=urn:btih:ABC");
        assert_eq!(provider.get_magnet_link(&AnimeTorrent::default()), "");
    }

    #[test]
    fn test_settings() {
        let provider = SubsPleaseProvider::new(StubFetcher::new(200, "[]"));
        let settings = provider.settings();

        assert!(settings.can_smart_search);
        assert!(!settings.supports_adult);
        assert_eq!(
            settings.smart_search_filters,
            vec![SmartSearchFilter::EpisodeNumber, SmartSearchFilter::Resolution]
        );
    }
}
