use crate::domain::ports::FeedCache;
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

const MAX_FEEDS: u64 = 256;

/// In-memory feed store; entries expire `ttl` after they were written.
pub struct MokaFeedCache {
    cache: Cache<String, String>,
}

impl MokaFeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_FEEDS)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl FeedCache for MokaFeedCache {
    async fn get(&self, url: &str) -> Option<String> {
        self.cache.get(url).await
    }

    async fn set(&self, url: &str, body: String) {
        self.cache.insert(url.to_string(), body).await;
    }

    async fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
