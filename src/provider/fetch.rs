//! Feed transport
//!
//! The provider only needs "GET this query, give me status and body". Keeping
//! that behind a trait lets tests replay canned payloads.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::Result;
use crate::config::FeedSettings;

/// Raw response from the feed endpoint
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetch capability injected into providers
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Issue one feed search for `query`
    async fn fetch(&self, query: &str) -> Result<FetchResponse>;
}

/// reqwest-backed fetcher for the SubsPlease API
pub struct HttpFeedFetcher {
    http: Client,
    base_url: Url,
    timezone: String,
}

impl HttpFeedFetcher {
    pub fn new(settings: &FeedSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid feed URL: {}", settings.base_url))?;

        Ok(Self {
            http,
            base_url,
            timezone: settings.timezone.clone(),
        })
    }

    /// Build the request URL for a search
    fn request_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("f", "search")
            .append_pair("tz", &self.timezone)
            .append_pair("s", query);
        url
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, query: &str) -> Result<FetchResponse> {
        let url = self.request_url(query);
        debug!("Fetching feed: {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}
