//! Transport layer for the video platform's Data API.
//!
//! [`VideoPlatform`] is the seam the pipeline is built against; [`YouTubeClient`]
//! is the HTTP implementation. Tests substitute in-memory platforms.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::config::Config;
use crate::data_models::{SafeSearch, SearchOrder};
use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Largest `maxResults` the search endpoint accepts per page.
pub const MAX_SEARCH_PAGE_SIZE: u32 = 50;
/// Largest number of ids the videos endpoint accepts per call.
pub const MAX_IDS_PER_CALL: usize = 50;

pub const VIDEO_KIND: &str = "youtube#video";

/// Parameters for one page of `search.list`.
#[derive(Debug, Clone)]
pub struct SearchParams<'a> {
    pub query: &'a str,
    pub page_size: u32,
    pub order: SearchOrder,
    pub safe_search: SafeSearch,
    pub page_token: Option<&'a str>,
}

#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// One page of search results, in the platform's order.
    async fn search_page(&self, params: &SearchParams<'_>) -> Result<SearchPage>;

    /// Statistics for at most [`MAX_IDS_PER_CALL`] ids. Unknown ids are left out.
    async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoItem>>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: ResourceId,
    #[serde(default)]
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Largest available thumbnail, or an empty string.
    pub fn best_url(&self) -> String {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .next()
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub statistics: Statistics,
}

/// Counters as the platform reports them. Kept as text; parsing happens later.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default, deserialize_with = "count_text")]
    pub view_count: Option<String>,
    #[serde(default, deserialize_with = "count_text")]
    pub like_count: Option<String>,
    #[serde(default, deserialize_with = "count_text")]
    pub comment_count: Option<String>,
    #[serde(default, deserialize_with = "count_text")]
    pub favorite_count: Option<String>,
}

/// Counts are documented as strings but are numbers in some payloads.
fn count_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// HTTP client for the platform's `search` and `videos` endpoints.
pub struct YouTubeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
    }

    async fn get_json<T>(
        &self,
        call: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::upstream(call, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus {
                call,
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| Error::upstream(call, e))
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn search_page(&self, params: &SearchParams<'_>) -> Result<SearchPage> {
        let mut query = vec![
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("q", params.query.to_string()),
            ("maxResults", params.page_size.min(MAX_SEARCH_PAGE_SIZE).to_string()),
            ("order", params.order.as_str().to_string()),
            ("safeSearch", params.safe_search.as_str().to_string()),
        ];
        if let Some(token) = params.page_token {
            query.push(("pageToken", token.to_string()));
        }
        self.get_json("search", "search", &query).await
    }

    async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = [("part", "statistics".to_string()), ("id", ids.join(","))];
        let response: VideoListResponse = self.get_json("videos", "videos", &query).await?;
        Ok(response.items)
    }
}
