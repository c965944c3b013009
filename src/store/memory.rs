use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::store::{Dataset, Store, StoreResult};
use crate::{EngagementRecord, Post};

/// In-process store, mainly for tests and embedding callers that already hold
/// their data.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Dataset>,
}

impl MemoryStore {
    pub fn new(posts: Vec<Post>, analytics: Vec<EngagementRecord>) -> Self {
        Self::from_dataset(Dataset {
            posts,
            analytics,
            audiences: Vec::new(),
        })
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            data: RwLock::new(dataset),
        }
    }

    pub async fn add_post(&self, post: Post) {
        let mut guard = self.data.write().await;
        guard.posts.retain(|existing| existing.id != post.id);
        guard.posts.push(post);
    }

    pub async fn record(&self, record: EngagementRecord) {
        let mut guard = self.data.write().await;
        guard.analytics.push(record);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn analytics_by_timeframe(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<EngagementRecord>> {
        let guard = self.data.read().await;
        Ok(guard.analytics_between(start, end))
    }

    async fn posts(&self) -> StoreResult<Vec<Post>> {
        let guard = self.data.read().await;
        Ok(guard.posts.clone())
    }

    async fn post_analytics(&self, post_id: &str) -> StoreResult<Vec<EngagementRecord>> {
        let guard = self.data.read().await;
        Ok(guard.analytics_for_post(post_id))
    }
}
