use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{Dataset, Store, StoreResult};
use crate::{AudienceProfile, EngagementRecord, Post};

/// Dataset kept in a single JSON file and loaded into memory.
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<Dataset>,
}

impl JsonFileStore {
    pub async fn load(path: PathBuf) -> StoreResult<Self> {
        let data = if path.exists() {
            let contents = tokio::fs::read_to_string(&path).await?;
            if contents.trim().is_empty() {
                Dataset::default()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            Dataset::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn audience(&self, audience_id: &str) -> Option<AudienceProfile> {
        let guard = self.data.read().await;
        guard.audience(audience_id)
    }

    pub async fn replace(&self, dataset: Dataset) -> StoreResult<()> {
        let mut guard = self.data.write().await;
        *guard = dataset;
        self.persist(&guard).await
    }

    async fn persist(&self, dataset: &Dataset) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(dataset)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for JsonFileStore {
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

async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
