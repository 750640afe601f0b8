//! Price-feed caching: freshness policy, the read-through cache manager,
//! and the scheduled warmer.

pub mod cache;
pub mod freshness;
pub mod warmer;

pub use cache::FeedCache;
pub use warmer::{spawn_warm_loop, warm_cache, WarmSummary};
