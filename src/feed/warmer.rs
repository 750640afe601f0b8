//! Scheduled cache warming.
//!
//! Sweeps the symbol × interval matrix through `get_feed` so the read path
//! stays warm between user renders. Each cell is isolated: one bad symbol
//! or a provider outage never prevents warming the rest. The sweep is
//! idempotent because `get_feed` only touches the network when an entry is
//! stale.

use crate::feed::cache::FeedCache;
use crate::models::{Interval, Symbol};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Intervals refreshed each sweep, biased toward the views users actually
/// open. The long tail (30m, 4h, 1w) fills on demand.
pub const WARM_INTERVALS: [Interval; 5] = [
    Interval::M1,
    Interval::M5,
    Interval::M15,
    Interval::H1,
    Interval::D1,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmSummary {
    pub warmed: usize,
    pub failed: usize,
}

/// One sweep over the warm matrix. Per-cell outcomes are logged; failures
/// never abort the sweep.
pub async fn warm_cache(cache: &FeedCache) -> WarmSummary {
    let mut summary = WarmSummary::default();
    for symbol in Symbol::ALL {
        for interval in WARM_INTERVALS {
            match cache.get_feed(symbol, interval).await {
                Ok(feed) if feed.synthetic => {
                    summary.failed += 1;
                    warn!(%symbol, %interval, "warm cell not populated, provider unavailable");
                }
                Ok(feed) => {
                    summary.warmed += 1;
                    debug!(%symbol, %interval, last = feed.last, "warm cell refreshed");
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(%symbol, %interval, error = %err, "warm cell failed");
                }
            }
        }
    }
    info!(
        warmed = summary.warmed,
        failed = summary.failed,
        "cache warm sweep complete"
    );
    summary
}

/// Background warm loop on a fixed period (the host schedules this every
/// 1-5 minutes).
pub fn spawn_warm_loop(cache: Arc<FeedCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            warm_cache(&cache).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, Result};
    use crate::feed::cache::PRICE_CACHE_NS;
    use crate::models::{Candle, PriceFeed};
    use crate::providers::PriceProvider;
    use crate::store::MemoryKvStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyProvider {
        failing: Mutex<Vec<(Symbol, Interval)>>,
        calls: AtomicUsize,
    }

    impl FlakyProvider {
        fn new(failing: Vec<(Symbol, Interval)>) -> Self {
            Self {
                failing: Mutex::new(failing),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceProvider for FlakyProvider {
        async fn fetch(&self, symbol: Symbol, interval: Interval) -> Result<PriceFeed> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.lock().contains(&(symbol, interval)) {
                return Err(CoreError::upstream("flaky", Some(503), "unavailable"));
            }
            Ok(PriceFeed::from_candles(
                symbol,
                interval,
                vec![Candle {
                    timestamp_ms: 0,
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                }],
            ))
        }
    }

    #[tokio::test]
    async fn one_failing_cell_does_not_abort_the_sweep() {
        let provider = Arc::new(FlakyProvider::new(vec![(Symbol::Silver, Interval::M1)]));
        let kv = Arc::new(MemoryKvStore::new());
        let cache = FeedCache::new(provider, kv.clone());

        let summary = warm_cache(&cache).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.warmed, 9);
        // The other 9 cells are populated; the failing one is not.
        assert_eq!(kv.len(PRICE_CACHE_NS), 9);
    }

    #[tokio::test]
    async fn back_to_back_sweeps_reuse_fresh_entries() {
        let provider = Arc::new(FlakyProvider::new(Vec::new()));
        let kv = Arc::new(MemoryKvStore::new());
        let cache = FeedCache::new(provider.clone(), kv);

        let first = warm_cache(&cache).await;
        assert_eq!(first.warmed, 10);
        let fetches_after_first = provider.calls.load(Ordering::SeqCst);
        assert_eq!(fetches_after_first, 10);

        let second = warm_cache(&cache).await;
        assert_eq!(second.warmed, 10);
        assert_eq!(provider.calls.load(Ordering::SeqCst), fetches_after_first);
    }
}
