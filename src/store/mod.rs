//! Source of posts and engagement history.
//!
//! The analysis components never reach for storage on their own; a
//! [`Store`] is handed to [`crate::SchedulingService`] at construction and
//! queried once per top-level call.

pub mod json;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::{AudienceProfile, EngagementRecord, Post};

pub use json::JsonFileStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Records with `start <= recorded_at < end`.
    async fn analytics_by_timeframe(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<EngagementRecord>>;

    async fn posts(&self) -> StoreResult<Vec<Post>>;

    async fn post_analytics(&self, post_id: &str) -> StoreResult<Vec<EngagementRecord>>;
}

/// Everything a store holds, in the shape the JSON file uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub analytics: Vec<EngagementRecord>,
    #[serde(default)]
    pub audiences: Vec<AudienceProfile>,
}

impl Dataset {
    pub fn analytics_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<EngagementRecord> {
        self.analytics
            .iter()
            .filter(|record| record.recorded_at >= start && record.recorded_at < end)
            .cloned()
            .collect()
    }

    pub fn analytics_for_post(&self, post_id: &str) -> Vec<EngagementRecord> {
        self.analytics
            .iter()
            .filter(|record| record.post_id == post_id)
            .cloned()
            .collect()
    }

    pub fn audience(&self, audience_id: &str) -> Option<AudienceProfile> {
        self.audiences
            .iter()
            .find(|audience| audience.id == audience_id)
            .cloned()
    }
}
