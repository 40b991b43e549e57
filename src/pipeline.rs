use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use crate::cache::QueryCache;
use crate::config::Config;
use crate::data_models::{RankKey, ResultSet, SearchRequest};
use crate::error::Result;
use crate::normalizer;
use crate::ranker;
use crate::search_client::SearchClient;
use crate::stats_fetcher::StatsFetcher;
use crate::youtube::{MAX_IDS_PER_CALL, MAX_SEARCH_PAGE_SIZE, VideoPlatform, YouTubeClient};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub search_page_size: u32,
    pub stats_batch_size: usize,
    pub stats_concurrency: usize,
    pub cache_ttl: Option<Duration>,
    pub rank_key: RankKey,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            search_page_size: MAX_SEARCH_PAGE_SIZE,
            stats_batch_size: MAX_IDS_PER_CALL,
            stats_concurrency: 1,
            cache_ttl: None,
            rank_key: RankKey::Views,
        }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            search_page_size: config.search_page_size,
            stats_batch_size: config.stats_batch_size,
            stats_concurrency: config.stats_concurrency,
            cache_ttl: config.cache_ttl,
            rank_key: config.rank_key,
        }
    }
}

/// search -> statistics -> normalize -> rank, memoized per request.
pub struct Pipeline<P> {
    search_client: SearchClient<P>,
    stats_fetcher: StatsFetcher<P>,
    cache: QueryCache,
    rank_key: RankKey,
}

impl Pipeline<YouTubeClient> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = YouTubeClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), config.into()))
    }
}

impl<P: VideoPlatform> Pipeline<P> {
    pub fn new(platform: Arc<P>, options: PipelineOptions) -> Self {
        Self {
            search_client: SearchClient::new(platform.clone(), options.search_page_size),
            stats_fetcher: StatsFetcher::new(
                platform,
                options.stats_batch_size,
                options.stats_concurrency,
            ),
            cache: QueryCache::new(options.cache_ttl),
            rank_key: options.rank_key,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn rank_key(&self) -> RankKey {
        self.rank_key
    }

    /// Ranked records for `request`, served from the cache when possible.
    pub async fn run(&self, request: &SearchRequest) -> Result<Arc<ResultSet>> {
        self.cache
            .get_or_compute(request, || self.compute(request))
            .await
    }

    async fn compute(&self, request: &SearchRequest) -> Result<ResultSet> {
        let span = tracing::info_span!(
            "pipeline",
            query = request.query(),
            rank_key = %self.rank_key
        );
        async move {
            let refs = self.search_client.search(request).await?;
            if refs.is_empty() {
                tracing::info!("search returned no videos");
                return Ok(ResultSet::empty(request.canonical_query()));
            }

            let ids: BTreeSet<String> = refs.iter().map(|r| r.id.clone()).collect();
            let stats = self.stats_fetcher.fetch_stats(&ids).await?;
            if stats.len() < ids.len() {
                tracing::debug!(
                    missing = ids.len() - stats.len(),
                    "some videos have no statistics, zero-filling"
                );
            }

            let records = normalizer::merge(refs, &stats);
            let mut ranked = ranker::rank(records, self.rank_key);
            ranked.truncate(request.max_results() as usize);

            let result = ResultSet::from_ranked(request.canonical_query(), ranked);
            tracing::info!(
                records = result.len(),
                total_views = result.total_views,
                "pipeline computed"
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }
}
