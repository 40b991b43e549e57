use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MIN_RESULTS: u32 = 10;
pub const MAX_RESULTS: u32 = 50;
pub const DEFAULT_RESULTS: u32 = 25;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum SearchOrder {
    #[default]
    Relevance,
    Date,
    ViewCount,
    Rating,
    Title,
}

impl SearchOrder {
    /// Value of the platform's `order` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::Date => "date",
            SearchOrder::ViewCount => "viewCount",
            SearchOrder::Rating => "rating",
            SearchOrder::Title => "title",
        }
    }
}

impl FromStr for SearchOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SearchOrder::Relevance),
            "date" => Ok(SearchOrder::Date),
            "viewcount" | "views" => Ok(SearchOrder::ViewCount),
            "rating" => Ok(SearchOrder::Rating),
            "title" => Ok(SearchOrder::Title),
            other => Err(Error::InvalidRequest(format!("unknown order: {other}"))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    None,
    #[default]
    Moderate,
    Strict,
}

impl SafeSearch {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafeSearch::None => "none",
            SafeSearch::Moderate => "moderate",
            SafeSearch::Strict => "strict",
        }
    }
}

impl FromStr for SafeSearch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SafeSearch::None),
            "moderate" => Ok(SafeSearch::Moderate),
            "strict" => Ok(SafeSearch::Strict),
            other => Err(Error::InvalidRequest(format!("unknown safe search level: {other}"))),
        }
    }
}

/// One search as issued by a caller. Built through [`SearchRequest::new`],
/// never mutated afterwards.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    max_results: u32,
    order: SearchOrder,
    safe_search: SafeSearch,
}

impl SearchRequest {
    /// `max_results` is clamped to `MIN_RESULTS..=MAX_RESULTS`. A blank query is rejected.
    pub fn new(
        query: impl Into<String>,
        max_results: u32,
        order: SearchOrder,
        safe_search: SafeSearch,
    ) -> Result<Self> {
        let query = query.into().trim().to_string();
        if query.is_empty() {
            return Err(Error::InvalidRequest("query cannot be empty".into()));
        }
        Ok(SearchRequest {
            query,
            max_results: max_results.clamp(MIN_RESULTS, MAX_RESULTS),
            order,
            safe_search,
        })
    }

    /// Default parameters: 25 results, relevance order, moderate safe search.
    pub fn with_query(query: impl Into<String>) -> Result<Self> {
        Self::new(
            query,
            DEFAULT_RESULTS,
            SearchOrder::default(),
            SafeSearch::default(),
        )
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn order(&self) -> SearchOrder {
        self.order
    }

    pub fn safe_search(&self) -> SafeSearch {
        self.safe_search
    }

    /// Query text lower-cased with whitespace runs collapsed. Requests that
    /// share a cache key share this text.
    pub fn canonical_query(&self) -> String {
        self.query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Order-stable serialization used as the cache key.
    pub fn cache_key(&self) -> String {
        format!(
            "q={}|max={}|order={}|safe={}",
            self.canonical_query(),
            self.max_results,
            self.order.as_str(),
            self.safe_search.as_str()
        )
    }
}

/// Identity result from a search call, before statistics are attached.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VideoRef {
    pub id: String,
    pub title: String,
    pub channel: String,
    /// Raw RFC 3339 timestamp as sent by the platform.
    pub published_at: String,
    pub thumbnail_url: String,
}

/// Raw counters for one video. Any of them may be missing (hidden likes,
/// disabled comments) or carry text that does not parse as a count.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StatsBlock {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
    pub favorite_count: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub published_at: Option<NaiveDate>,
    pub thumbnail_url: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub favorite_count: u64,
    /// `like_count / view_count`, 0 when there are no views.
    pub like_rate: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankKey {
    #[default]
    Views,
    Likes,
    /// `views + 10 * likes`.
    Composite,
}

impl FromStr for RankKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "views" => Ok(RankKey::Views),
            "likes" => Ok(RankKey::Likes),
            "composite" => Ok(RankKey::Composite),
            other => Err(Error::InvalidRequest(format!("unknown rank key: {other}"))),
        }
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankKey::Views => "views",
            RankKey::Likes => "likes",
            RankKey::Composite => "composite",
        };
        f.write_str(name)
    }
}

/// Ranked records plus aggregates computed once over them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub query: String,
    pub records: Vec<VideoRecord>,
    pub total_views: u64,
    pub avg_views: f64,
    pub avg_likes: f64,
    pub distinct_channel_count: usize,
    pub top_channel: Option<String>,
}

impl ResultSet {
    pub fn empty(query: impl Into<String>) -> Self {
        ResultSet::from_ranked(query, Vec::new())
    }

    /// Wraps an already ranked collection and computes its aggregates.
    pub fn from_ranked(query: impl Into<String>, records: Vec<VideoRecord>) -> Self {
        // Counters can sit at u64::MAX after coercion, so sums saturate.
        let total_views = records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.view_count));
        let total_likes = records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.like_count));
        let (avg_views, avg_likes) = if records.is_empty() {
            (0.0, 0.0)
        } else {
            let n = records.len() as f64;
            (total_views as f64 / n, total_likes as f64 / n)
        };

        let mut views_by_channel: std::collections::BTreeMap<&str, u64> =
            std::collections::BTreeMap::new();
        for record in &records {
            let views = views_by_channel.entry(record.channel.as_str()).or_insert(0);
            *views = views.saturating_add(record.view_count);
        }
        // BTreeMap iterates names ascending, so the first maximum wins ties.
        let top_channel = views_by_channel
            .iter()
            .fold(None::<(&str, u64)>, |best, (&name, &views)| match best {
                Some((_, best_views)) if best_views >= views => best,
                _ => Some((name, views)),
            })
            .map(|(name, _)| name.to_string());

        ResultSet {
            query: query.into(),
            distinct_channel_count: views_by_channel.len(),
            records,
            total_views,
            avg_views,
            avg_likes,
            top_channel,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
