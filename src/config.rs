//! Price-provider configuration.
//!
//! Provider selection, API base URL, and keys travel as one explicit value
//! into the feed cache constructor instead of being fetched ad hoc inside
//! fetch logic.

use crate::context::{EnvSecrets, Secrets};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which upstream price API serves candle data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// metals.dev timeseries API (default). Real intraday OHLC.
    MetalsDev,
    /// metals-api.com daily rates. Degenerate candles, daily resolution.
    MetalsApi,
}

#[derive(Debug, Clone)]
pub struct PriceConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    /// Overrides the provider's default base URL when set.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl PriceConfig {
    pub const PROVIDER_FLAG: &'static str = "PRICE_API";
    pub const BASE_URL_KEY: &'static str = "PRICE_API_URL";
    pub const METALS_DEV_KEY: &'static str = "METALS_DEV_KEY";
    pub const METALS_API_KEY: &'static str = "METALS_API_KEY";

    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Build from the host's secrets/settings capability. Missing key for
    /// the selected provider is a hard config error.
    pub fn from_secrets(secrets: &dyn Secrets) -> Result<Self> {
        let provider = match secrets.get(Self::PROVIDER_FLAG).as_deref() {
            Some("METALS_API") => ProviderKind::MetalsApi,
            _ => ProviderKind::MetalsDev,
        };
        let key_name = match provider {
            ProviderKind::MetalsDev => Self::METALS_DEV_KEY,
            ProviderKind::MetalsApi => Self::METALS_API_KEY,
        };
        let api_key = secrets
            .get(key_name)
            .ok_or(CoreError::ConfigMissing(key_name))?;

        Ok(Self {
            provider,
            api_key,
            base_url: secrets.get(Self::BASE_URL_KEY),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_secrets(&EnvSecrets)
    }
}
