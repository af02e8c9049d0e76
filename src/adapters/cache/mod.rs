//! Tracking cache
//!
//! Correlation state between the send and retrieve paths lives in an
//! external TTL key-value store, because the two paths run as separate
//! scheduled invocations with no shared process memory. The engine only
//! depends on the [`TrackingCache`] capability interface; any TTL-capable
//! store can sit behind it. [`InMemoryTrackingCache`] is the in-process
//! reference implementation.

use crate::domain::{BridgeError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// TTL key-value store used for request/response correlation.
#[async_trait]
pub trait TrackingCache: Send + Sync {
    /// Store a value under a key with a time-to-live. Last writer wins.
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Fetch a value by key. `None` means the key is absent or expired;
    /// callers on the retrieve path treat that as a hard correlation miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Store a JSON-serialized value under a key.
pub async fn put_json<T: Serialize + Sync>(
    cache: &dyn TrackingCache,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    cache.put(key, bytes, ttl).await
}

/// Fetch and JSON-deserialize a value by key.
pub async fn get_json<T: DeserializeOwned>(
    cache: &dyn TrackingCache,
    key: &str,
) -> Result<Option<T>> {
    match cache.get(key).await? {
        Some(bytes) => {
            let value = serde_json::from_slice(&bytes).map_err(|e| {
                BridgeError::Cache(format!("cached value under {key} is not valid JSON: {e}"))
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

struct CacheEntry {
    expires_at: Instant,
    value: Vec<u8>,
}

/// In-process TTL cache with lazy expiry on read.
#[derive(Default)]
pub struct InMemoryTrackingCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryTrackingCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackingCache for InMemoryTrackingCache {
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                expires_at: Instant::now() + ttl,
                value,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop the entry on the way out.
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(None)
    }
}
