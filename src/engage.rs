//! Engagement tracking: per-post render counters and a bounded snapshot
//! log sampled on the host's schedule.

use crate::error::{CoreError, Result};
use crate::models::{EngagementSnapshot, RenderCounter};
use crate::store::KvStore;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const ENGAGE_NS: &str = "engage";

/// 24h of 5-minute samples. Oldest entries are evicted past this.
pub const SNAPSHOT_CAP: usize = 288;

/// Current platform stats for a post.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PostMetrics {
    pub score: i64,
    pub comment_count: u64,
}

/// Post-stats lookup supplied by the host platform.
#[async_trait]
pub trait PostStats: Send + Sync {
    async fn post_stats(&self, post_id: &str) -> Result<PostMetrics>;
}

pub struct EngagementTracker {
    kv: Arc<dyn KvStore>,
    stats: Arc<dyn PostStats>,
}

impl EngagementTracker {
    pub fn new(kv: Arc<dyn KvStore>, stats: Arc<dyn PostStats>) -> Self {
        Self { kv, stats }
    }

    fn counter_key(post_id: &str) -> String {
        format!("r:{post_id}")
    }

    fn snapshot_key(post_id: &str) -> String {
        format!("s:{post_id}")
    }

    async fn read_counter(&self, post_id: &str) -> Result<RenderCounter> {
        let counter = match self.kv.get(ENGAGE_NS, &Self::counter_key(post_id)).await? {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => RenderCounter::default(),
        };
        Ok(counter)
    }

    /// Advisory popularity counter. The read-modify-write is not atomic;
    /// concurrent renders of one post may lose an increment.
    pub async fn increment_render(&self, post_id: &str) -> Result<u64> {
        let mut counter = self.read_counter(post_id).await?;
        counter.renders += 1;
        let value = serde_json::to_value(counter).map_err(|e| CoreError::store(e.to_string()))?;
        self.kv
            .set(ENGAGE_NS, &Self::counter_key(post_id), value, None)
            .await?;
        Ok(counter.renders)
    }

    /// Sample platform stats plus the render counter, append to the post's
    /// snapshot log, and drop the oldest entries past the cap.
    pub async fn snapshot(&self, post_id: &str) -> Result<EngagementSnapshot> {
        let metrics = self.stats.post_stats(post_id).await?;
        let counter = self.read_counter(post_id).await?;

        let snap = EngagementSnapshot {
            timestamp_ms: Utc::now().timestamp_millis(),
            score: metrics.score,
            comment_count: metrics.comment_count,
            renders: counter.renders,
        };

        let key = Self::snapshot_key(post_id);
        let mut log: Vec<EngagementSnapshot> = match self.kv.get(ENGAGE_NS, &key).await? {
            Some(value) => serde_json::from_value(value).unwrap_or_default(),
            None => Vec::new(),
        };
        log.push(snap);
        if log.len() > SNAPSHOT_CAP {
            let overflow = log.len() - SNAPSHOT_CAP;
            log.drain(..overflow);
        }

        let value = serde_json::to_value(&log).map_err(|e| CoreError::store(e.to_string()))?;
        self.kv.set(ENGAGE_NS, &key, value, None).await?;
        debug!(post_id, entries = log.len(), "engagement snapshot recorded");
        Ok(snap)
    }
}
