use std::collections::HashSet;
use std::sync::Arc;

use crate::data_models::{SearchRequest, VideoRef};
use crate::error::Result;
use crate::youtube::{MAX_SEARCH_PAGE_SIZE, SearchItem, SearchParams, VIDEO_KIND, VideoPlatform};

pub struct SearchClient<P> {
    platform: Arc<P>,
    page_size: u32,
}

impl<P: VideoPlatform> SearchClient<P> {
    pub fn new(platform: Arc<P>, page_size: u32) -> Self {
        Self {
            platform,
            page_size: page_size.clamp(1, MAX_SEARCH_PAGE_SIZE),
        }
    }

    /// Runs the search, following page tokens until `max_results` unique videos
    /// are collected or the platform runs out. Non-video hits are dropped and
    /// platform order is preserved. Zero matches is an empty vec, not an error.
    ///
    /// The platform has run out when it sends no next token, an empty page, or
    /// a token it already handed out.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<VideoRef>> {
        let wanted = request.max_results() as usize;
        let mut refs: Vec<VideoRef> = Vec::with_capacity(wanted);
        let mut seen: HashSet<String> = HashSet::new();
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;

        for page_number in 0usize.. {
            let remaining = (wanted - refs.len()) as u32;
            let params = SearchParams {
                query: request.query(),
                page_size: remaining.min(self.page_size),
                order: request.order(),
                safe_search: request.safe_search(),
                page_token: page_token.as_deref(),
            };
            let page = self.platform.search_page(&params).await?;
            tracing::debug!(
                query = request.query(),
                page = page_number,
                items = page.items.len(),
                "fetched search page"
            );

            if page.items.is_empty() {
                break;
            }
            for item in page.items {
                if refs.len() == wanted {
                    break;
                }
                if let Some(video) = Self::to_video_ref(item) {
                    if seen.insert(video.id.clone()) {
                        refs.push(video);
                    }
                }
            }

            match page.next_page_token {
                Some(token) if refs.len() < wanted && seen_tokens.insert(token.clone()) => {
                    page_token = Some(token)
                }
                Some(token) if refs.len() < wanted => {
                    tracing::warn!(token = %token, "platform repeated a page token, stopping");
                    break;
                }
                _ => break,
            }
        }

        Ok(refs)
    }

    fn to_video_ref(item: SearchItem) -> Option<VideoRef> {
        if item.id.kind != VIDEO_KIND {
            return None;
        }
        let id = item.id.video_id.filter(|id| !id.is_empty())?;
        Some(VideoRef {
            id,
            thumbnail_url: item.snippet.thumbnails.best_url(),
            title: item.snippet.title,
            channel: item.snippet.channel_title,
            published_at: item.snippet.published_at,
        })
    }
}
