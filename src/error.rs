//! Error taxonomy for the price-feed core.
//!
//! Batch operations (cache warming, leaderboard scans) isolate and log
//! individual failures instead of aborting; single-key cache failures fall
//! back to stale data when any exists. Only store failures and missing
//! configuration propagate to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Provider HTTP failure or malformed response. Recovered by falling
    /// back to the stale cache entry when one exists.
    #[error("upstream error from {provider} (status {status:?}): {message}")]
    Upstream {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// Underlying key-value store unavailable. No further fallback.
    #[error("cache store error: {0}")]
    CacheStore(String),

    /// One post/comment page failed during a leaderboard scan. Logged and
    /// skipped; partial results from other posts still contribute.
    #[error("partial scan failure on {item}: {message}")]
    PartialScan { item: String, message: String },

    /// Required secret or setting absent. No retry; a retry cannot produce
    /// a different config.
    #[error("missing required config: {0}")]
    ConfigMissing(&'static str),
}

impl CoreError {
    pub fn upstream(provider: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::CacheStore(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
