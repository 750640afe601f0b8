//! Key-value storage capability.
//!
//! The host platform supplies the real persistent store; the core only
//! depends on this trait. `MemoryKvStore` backs tests and local runs.

use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Namespaced JSON key-value store with optional per-key expiry.
/// Implementation failures surface as `CoreError::CacheStore`.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, ns: &str, key: &str) -> Result<Option<Value>>;
    async fn set(&self, ns: &str, key: &str, value: Value, ttl: Option<Duration>) -> Result<()>;
    async fn del(&self, ns: &str, key: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    expires_at_ms: Option<i64>,
}

/// In-process store over a locked map. Expired slots are evicted lazily on
/// read.
#[derive(Default)]
pub struct MemoryKvStore {
    slots: RwLock<HashMap<(String, String), Slot>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) keys in a namespace.
    pub fn len(&self, ns: &str) -> usize {
        let now = Utc::now().timestamp_millis();
        self.slots
            .read()
            .iter()
            .filter(|((n, _), slot)| n == ns && slot.expires_at_ms.map_or(true, |e| e > now))
            .count()
    }

    pub fn is_empty(&self, ns: &str) -> bool {
        self.len(ns) == 0
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, ns: &str, key: &str) -> Result<Option<Value>> {
        let now = Utc::now().timestamp_millis();
        let full_key = (ns.to_string(), key.to_string());
        let mut slots = self.slots.write();
        match slots.get(&full_key) {
            Some(slot) if slot.expires_at_ms.map_or(false, |e| e <= now) => {
                slots.remove(&full_key);
                Ok(None)
            }
            Some(slot) => Ok(Some(slot.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, ns: &str, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let expires_at_ms =
            ttl.map(|d| Utc::now().timestamp_millis() + d.as_millis() as i64);
        self.slots.write().insert(
            (ns.to_string(), key.to_string()),
            Slot {
                value,
                expires_at_ms,
            },
        );
        Ok(())
    }

    async fn del(&self, ns: &str, key: &str) -> Result<()> {
        self.slots
            .write()
            .remove(&(ns.to_string(), key.to_string()));
        Ok(())
    }
}
