//! Read-through feed cache keyed by (symbol, interval).
//!
//! Lookup order: fresh cache entry, then one provider fetch behind a
//! per-key lock, then stale fallback when the fetch fails, then a marked
//! synthetic feed when there is nothing cached at all. Key-value store
//! failures are the only errors that reach the caller.

use crate::error::{CoreError, Result};
use crate::feed::freshness::is_fresh;
use crate::models::{CacheEntry, Interval, PriceFeed, Symbol};
use crate::providers::PriceProvider;
use crate::store::KvStore;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PRICE_CACHE_NS: &str = "price-cache";

pub struct FeedCache {
    provider: Arc<dyn PriceProvider>,
    kv: Arc<dyn KvStore>,
    // Per-key fetch locks so concurrent stale readers coalesce into one
    // upstream call.
    flights: Mutex<HashMap<(Symbol, Interval), Arc<tokio::sync::Mutex<()>>>>,
}

impl FeedCache {
    pub fn new(provider: Arc<dyn PriceProvider>, kv: Arc<dyn KvStore>) -> Self {
        Self {
            provider,
            kv,
            flights: Mutex::new(HashMap::new()),
        }
    }

    fn cache_key(symbol: Symbol, interval: Interval) -> String {
        format!("{}:{}", symbol.code(), interval.code())
    }

    async fn read_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        match self.kv.get(PRICE_CACHE_NS, key).await? {
            // A corrupt entry reads as a miss; the next fetch overwrites it.
            Some(value) => Ok(serde_json::from_value(value).ok()),
            None => Ok(None),
        }
    }

    fn flight_lock(&self, symbol: Symbol, interval: Interval) -> Arc<tokio::sync::Mutex<()>> {
        self.flights
            .lock()
            .entry((symbol, interval))
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Fetch-or-serve. Never fails on the degraded-but-cached path.
    pub async fn get_feed(&self, symbol: Symbol, interval: Interval) -> Result<PriceFeed> {
        let key = Self::cache_key(symbol, interval);

        let now = Utc::now().timestamp_millis();
        if let Some(entry) = self.read_entry(&key).await? {
            if is_fresh(interval, now - entry.fetched_at_ms) {
                debug!(key, "feed cache hit");
                return Ok(entry.feed);
            }
        }

        let lock = self.flight_lock(symbol, interval);
        let _guard = lock.lock().await;

        // Another caller may have refreshed the entry while we waited.
        let now = Utc::now().timestamp_millis();
        let stale = match self.read_entry(&key).await? {
            Some(entry) if is_fresh(interval, now - entry.fetched_at_ms) => {
                debug!(key, "feed refreshed by concurrent caller");
                return Ok(entry.feed);
            }
            other => other,
        };

        match self.provider.fetch(symbol, interval).await {
            Ok(feed) => {
                let entry = CacheEntry {
                    feed: feed.clone(),
                    fetched_at_ms: Utc::now().timestamp_millis(),
                };
                // Whole entry in one write; a reader never sees a partial feed.
                let value =
                    serde_json::to_value(&entry).map_err(|e| CoreError::store(e.to_string()))?;
                self.kv.set(PRICE_CACHE_NS, &key, value, None).await?;
                debug!(key, candles = feed.candles.len(), "feed cache refreshed");
                Ok(feed)
            }
            Err(err) => {
                if let Some(entry) = stale {
                    warn!(key, error = %err, "provider fetch failed, serving stale feed");
                    return Ok(entry.feed);
                }
                warn!(key, error = %err, "provider fetch failed with cold cache, serving synthetic feed");
                Ok(PriceFeed::synthetic(symbol, interval))
            }
        }
    }

    /// Drop all 16 (symbol, interval) entries. Per-key deletions are
    /// independent; one failure does not abort the rest.
    pub async fn clear_cache(&self) {
        let mut cleared = 0usize;
        for symbol in Symbol::ALL {
            for interval in Interval::ALL {
                let key = Self::cache_key(symbol, interval);
                match self.kv.del(PRICE_CACHE_NS, &key).await {
                    Ok(()) => cleared += 1,
                    Err(err) => warn!(key, error = %err, "failed to clear cache key"),
                }
            }
        }
        info!(cleared, "price cache cleared");
    }
}
