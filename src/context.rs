//! Explicit capability wiring for host entry points.
//!
//! The hosting runtime invokes renders and scheduled jobs as independent
//! units of work. Instead of an implicit global context, every entry point
//! receives this bundle of collaborators.

use crate::config::PriceConfig;
use crate::engage::{EngagementTracker, PostStats};
use crate::feed::cache::FeedCache;
use crate::http::{HttpFetch, ReqwestFetcher};
use crate::leaderboard::{ActivityReader, Leaderboard};
use crate::providers::build_provider;
use crate::store::KvStore;
use std::sync::Arc;

/// Secrets/settings lookup supplied by the host.
pub trait Secrets: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads secrets from the process environment (dotenv-compatible).
pub struct EnvSecrets;

impl Secrets for EnvSecrets {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// The core's public surface, wired once at startup. Render handlers and
/// the scheduler are two independent external callers of these components.
pub struct CoreContext {
    pub feeds: Arc<FeedCache>,
    pub engagement: Arc<EngagementTracker>,
    pub leaderboard: Arc<Leaderboard>,
}

impl CoreContext {
    pub fn new(
        config: &PriceConfig,
        kv: Arc<dyn KvStore>,
        http: Arc<dyn HttpFetch>,
        activity: Arc<dyn ActivityReader>,
        stats: Arc<dyn PostStats>,
    ) -> Self {
        let provider = build_provider(config, http);
        Self {
            feeds: Arc::new(FeedCache::new(provider, kv.clone())),
            engagement: Arc::new(EngagementTracker::new(kv.clone(), stats)),
            leaderboard: Arc::new(Leaderboard::new(activity, kv)),
        }
    }

    /// Wire with the default reqwest-backed fetcher using the configured
    /// request timeout.
    pub fn with_default_http(
        config: &PriceConfig,
        kv: Arc<dyn KvStore>,
        activity: Arc<dyn ActivityReader>,
        stats: Arc<dyn PostStats>,
    ) -> Self {
        let http = Arc::new(ReqwestFetcher::new(config.timeout));
        Self::new(config, kv, http, activity, stats)
    }
}
