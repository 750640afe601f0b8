//! Value types shared across the price-feed core: symbols, intervals,
//! candles, assembled feeds, and the cache/engagement/leaderboard records
//! persisted through the key-value store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported precious metal assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Silver,
    Gold,
}

impl Symbol {
    pub const ALL: [Symbol; 2] = [Symbol::Silver, Symbol::Gold];

    /// Quote symbol used in cache keys and provider A queries.
    pub fn code(&self) -> &'static str {
        match self {
            Symbol::Silver => "XAGUSD",
            Symbol::Gold => "XAUUSD",
        }
    }

    /// Bare metal code used by the daily-rate provider.
    pub fn metal(&self) -> &'static str {
        match self {
            Symbol::Silver => "XAG",
            Symbol::Gold => "XAU",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Chart granularities offered by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
    W1,
}

impl Interval {
    pub const ALL: [Interval; 8] = [
        Interval::M1,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H4,
        Interval::D1,
        Interval::W1,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::H4 => "4h",
            Interval::D1 => "1d",
            Interval::W1 => "1w",
        }
    }

    /// Sub-hour granularities get a short provider lookback window.
    pub fn is_sub_hour(&self) -> bool {
        matches!(
            self,
            Interval::M1 | Interval::M5 | Interval::M15 | Interval::M30
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One OHLC candlestick sample. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(rename = "t")]
    pub timestamp_ms: i64,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
}

/// Assembled price feed: ordered candle series plus the derived last price
/// and previous close. A refresh produces a new feed; feeds are never
/// mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFeed {
    pub symbol: Symbol,
    pub interval: Interval,
    pub candles: Vec<Candle>,
    pub last: f64,
    pub prev_close: f64,
    /// True when this feed is an empty fallback rather than provider data.
    #[serde(default)]
    pub synthetic: bool,
}

impl PriceFeed {
    /// Build a feed from a candle series, normalizing ordering (some
    /// providers return newest-first) and deriving last/prev_close.
    pub fn from_candles(symbol: Symbol, interval: Interval, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp_ms);
        let last = candles.last().map(|c| c.close).unwrap_or(0.0);
        let prev_close = if candles.len() >= 2 {
            candles[candles.len() - 2].close
        } else {
            last
        };
        Self {
            symbol,
            interval,
            candles,
            last,
            prev_close,
            synthetic: false,
        }
    }

    /// Marked empty fallback for the cold-cache failure path. Never mixed
    /// with real quotes without the `synthetic` flag set.
    pub fn synthetic(symbol: Symbol, interval: Interval) -> Self {
        Self {
            symbol,
            interval,
            candles: Vec::new(),
            last: 0.0,
            prev_close: 0.0,
            synthetic: true,
        }
    }

    /// Percent change of last over previous close.
    pub fn percent_change(&self) -> f64 {
        if self.prev_close == 0.0 {
            0.0
        } else {
            (self.last - self.prev_close) / self.prev_close * 100.0
        }
    }
}

/// Cache record owned by the feed cache manager, keyed by (symbol, interval).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub feed: PriceFeed,
    pub fetched_at_ms: i64,
}

/// Per-post render counter. Monotonic, never reset.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RenderCounter {
    pub renders: u64,
}

/// One engagement sample: platform stats plus the render counter at the
/// moment of sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub timestamp_ms: i64,
    pub score: i64,
    pub comment_count: u64,
    pub renders: u64,
}

/// One leaderboard entry, unique per author within an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub user: String,
    pub comment_count: u32,
    pub karma: i64,
}

/// Short-TTL cache record for a computed leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardCacheEntry {
    pub rows: Vec<LeaderboardRow>,
    pub computed_at_ms: i64,
}
