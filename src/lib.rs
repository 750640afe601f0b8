//! MetalBot Backend Library
//!
//! Core of the live metals price widget: the feed cache and provider
//! adapters, the scheduled cache warmer, engagement tracking, and the
//! daily commenter leaderboard. The hosting platform (rendering, menus,
//! notifications) stays behind the capability traits in `store`, `http`,
//! `engage`, and `leaderboard`.

pub mod config;
pub mod context;
pub mod engage;
pub mod error;
pub mod feed;
pub mod http;
pub mod leaderboard;
pub mod models;
pub mod providers;
pub mod store;

pub use config::{PriceConfig, ProviderKind};
pub use context::CoreContext;
pub use error::{CoreError, Result};
pub use feed::cache::FeedCache;
pub use feed::warmer::{spawn_warm_loop, warm_cache};
pub use models::{Candle, Interval, PriceFeed, Symbol};

/// Initialize tracing for hosts and binaries that have no subscriber yet.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metalbot_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
