use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};

use crate::data_models::StatsBlock;
use crate::error::Result;
use crate::youtube::{MAX_IDS_PER_CALL, VideoItem, VideoPlatform};

pub struct StatsFetcher<P> {
    platform: Arc<P>,
    batch_size: usize,
    concurrency: usize,
}

impl<P: VideoPlatform> StatsFetcher<P> {
    pub fn new(platform: Arc<P>, batch_size: usize, concurrency: usize) -> Self {
        Self {
            platform,
            batch_size: batch_size.clamp(1, MAX_IDS_PER_CALL),
            concurrency: concurrency.max(1),
        }
    }

    /// Fetches statistics for `ids` in batches of at most `batch_size`.
    ///
    /// Ids the platform does not return (deleted, private) are simply absent
    /// from the map. Any failed batch fails the whole fetch.
    pub async fn fetch_stats(
        &self,
        ids: &BTreeSet<String>,
    ) -> Result<HashMap<String, StatsBlock>> {
        let ids: Vec<String> = ids.iter().cloned().collect();
        let batches: Vec<Vec<String>> = ids
            .chunks(self.batch_size)
            .map(<[String]>::to_vec)
            .collect();
        tracing::debug!(ids = ids.len(), batches = batches.len(), "fetching statistics");

        let responses: Vec<Vec<VideoItem>> = stream::iter(batches)
            .map(|batch| {
                let platform = self.platform.clone();
                async move { platform.list_videos(&batch).await }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut stats = HashMap::with_capacity(ids.len());
        for item in responses.into_iter().flatten() {
            // Only keep ids that were asked for.
            if ids.binary_search(&item.id).is_err() {
                continue;
            }
            stats.entry(item.id).or_insert(StatsBlock {
                view_count: item.statistics.view_count,
                like_count: item.statistics.like_count,
                comment_count: item.statistics.comment_count,
                favorite_count: item.statistics.favorite_count,
            });
        }
        Ok(stats)
    }
}
