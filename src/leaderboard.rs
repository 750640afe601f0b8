//! Daily commenter leaderboard.
//!
//! Scans the community's posts for the current UTC day, accumulates
//! per-author comment count and karma, and caches the sorted top-N under a
//! short TTL keyed by community and UTC date.

use crate::error::{CoreError, Result};
use crate::models::{LeaderboardCacheEntry, LeaderboardRow};
use crate::store::KvStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const LEADERBOARD_NS: &str = "leaderboard";
pub const DEFAULT_LIMIT: usize = 10;

const CACHE_TTL_MS: i64 = 5 * 60 * 1000;
const POST_PAGE_LIMIT: usize = 100;
const COMMENT_PAGE_LIMIT: usize = 200;

/// System accounts and deleted-author placeholders never contribute rows.
const EXCLUDED_AUTHORS: [&str; 2] = ["AutoModerator", "[deleted]"];

#[derive(Debug, Clone)]
pub struct PostRef {
    pub id: String,
    pub author_name: Option<String>,
    pub score: i64,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone)]
pub struct CommentRef {
    pub id: String,
    pub author_name: Option<String>,
    /// Adapters normalize a missing score to 0.
    pub score: i64,
    pub created_at_ms: i64,
}

/// Community activity reader supplied by the host platform.
#[async_trait]
pub trait ActivityReader: Send + Sync {
    async fn list_recent_posts(&self, community: &str, limit: usize) -> Result<Vec<PostRef>>;
    async fn list_comments(&self, post_id: &str, limit: usize) -> Result<Vec<CommentRef>>;
}

pub struct Leaderboard {
    reader: Arc<dyn ActivityReader>,
    kv: Arc<dyn KvStore>,
}

fn start_of_utc_day_ms(now: DateTime<Utc>) -> i64 {
    now.date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp_millis()
}

fn utc_day_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

impl Leaderboard {
    pub fn new(reader: Arc<dyn ActivityReader>, kv: Arc<dyn KvStore>) -> Self {
        Self { reader, kv }
    }

    /// Aggregate today's comment activity into the top `limit` authors by
    /// karma. One post's comment-fetch failure is logged and skipped;
    /// partial results from the other posts still contribute.
    pub async fn daily_leaderboard(
        &self,
        community: &str,
        limit: usize,
    ) -> Result<Vec<LeaderboardRow>> {
        let start_of_day_ms = start_of_utc_day_ms(Utc::now());
        let posts = self
            .reader
            .list_recent_posts(community, POST_PAGE_LIMIT)
            .await?;
        info!(community, posts = posts.len(), "scanning posts for leaderboard");

        // Encounter order is kept so the stable sort leaves karma ties in
        // first-seen order.
        let mut order: Vec<String> = Vec::new();
        let mut rows: HashMap<String, LeaderboardRow> = HashMap::new();

        for post in &posts {
            if post.created_at_ms < start_of_day_ms {
                continue;
            }
            let comments = match self
                .reader
                .list_comments(&post.id, COMMENT_PAGE_LIMIT)
                .await
            {
                Ok(comments) => comments,
                Err(err) => {
                    let err = CoreError::PartialScan {
                        item: post.id.clone(),
                        message: err.to_string(),
                    };
                    warn!(error = %err, "skipping post, continuing scan");
                    continue;
                }
            };

            for comment in comments {
                let Some(author) = comment.author_name.as_deref() else {
                    continue;
                };
                if author.is_empty() || EXCLUDED_AUTHORS.contains(&author) {
                    continue;
                }
                if comment.created_at_ms < start_of_day_ms {
                    continue;
                }

                let row = rows.entry(author.to_string()).or_insert_with(|| {
                    order.push(author.to_string());
                    LeaderboardRow {
                        user: author.to_string(),
                        comment_count: 0,
                        karma: 0,
                    }
                });
                row.comment_count += 1;
                row.karma += comment.score;
            }
        }

        let mut out: Vec<LeaderboardRow> = order
            .iter()
            .filter_map(|user| rows.get(user).cloned())
            .collect();
        out.sort_by(|a, b| b.karma.cmp(&a.karma));
        out.truncate(limit);
        info!(community, rows = out.len(), "daily leaderboard built");
        Ok(out)
    }

    /// TTL-cached wrapper. Any failure degrades to an empty list; showing
    /// "no data" beats breaking the view.
    pub async fn cached_leaderboard(&self, community: &str) -> Vec<LeaderboardRow> {
        let key = format!("{community}:{}", utc_day_key(Utc::now()));
        let now = Utc::now().timestamp_millis();

        match self.kv.get(LEADERBOARD_NS, &key).await {
            Ok(Some(value)) => {
                if let Ok(entry) = serde_json::from_value::<LeaderboardCacheEntry>(value) {
                    if now - entry.computed_at_ms < CACHE_TTL_MS {
                        debug!(community, "returning cached leaderboard");
                        return entry.rows;
                    }
                }
            }
            Ok(None) => {}
            Err(err) => warn!(community, error = %err, "leaderboard cache read failed"),
        }

        match self.daily_leaderboard(community, DEFAULT_LIMIT).await {
            Ok(rows) => {
                // Stamped after the scan so the TTL is not shortened by
                // however long the aggregation took.
                let entry = LeaderboardCacheEntry {
                    rows: rows.clone(),
                    computed_at_ms: Utc::now().timestamp_millis(),
                };
                if let Ok(value) = serde_json::to_value(&entry) {
                    if let Err(err) = self
                        .kv
                        .set(
                            LEADERBOARD_NS,
                            &key,
                            value,
                            Some(Duration::from_millis(CACHE_TTL_MS as u64)),
                        )
                        .await
                    {
                        warn!(community, error = %err, "leaderboard cache write failed");
                    }
                }
                rows
            }
            Err(err) => {
                warn!(community, error = %err, "leaderboard aggregation failed");
                Vec::new()
            }
        }
    }
}
