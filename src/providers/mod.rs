//! Upstream price API adapters.
//!
//! Two independent fetch strategies produce a `PriceFeed` from network
//! input. They are isolated so one provider's failure or response format
//! never corrupts the other; selection happens once via configuration.

pub mod metals_api;
pub mod metals_dev;

pub use metals_api::MetalsApiProvider;
pub use metals_dev::MetalsDevProvider;

use crate::config::{PriceConfig, ProviderKind};
use crate::error::Result;
use crate::http::HttpFetch;
use crate::models::{Interval, PriceFeed, Symbol};
use async_trait::async_trait;
use std::sync::Arc;

/// The single capability both adapters implement.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch(&self, symbol: Symbol, interval: Interval) -> Result<PriceFeed>;
}

pub fn build_provider(config: &PriceConfig, http: Arc<dyn HttpFetch>) -> Arc<dyn PriceProvider> {
    match config.provider {
        ProviderKind::MetalsDev => Arc::new(MetalsDevProvider::new(config.clone(), http)),
        ProviderKind::MetalsApi => Arc::new(MetalsApiProvider::new(config.clone(), http)),
    }
}
