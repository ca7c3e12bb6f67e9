//! Pluggable timestamp cache consulted by the block index client.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Cache key for a resolved block-hash timestamp.
pub fn block_timestamp_key(hash: &str) -> String {
    format!("block:timestamp:{hash}")
}

/// Cache key for the latest block timestamp.
pub const LATEST_TIMESTAMP_KEY: &str = "block:timestamp:latest";

/// How long the latest block timestamp may be served from cache.
///
/// "Latest" changes with every produced block, so this is a short fixed
/// window, independent of the configured maximum expiry.
pub const LATEST_TIMESTAMP_TTL: Duration = Duration::from_secs(6);

/// Capability interface for the timestamp cache.
///
/// Lookups happen before any network access. Writes are fire-and-forget
/// from the caller's perspective: an implementation backed by a fallible
/// store must swallow its own write errors rather than fail the caller.
/// Check-then-set is not atomic across calls; concurrent misses racing to
/// write the same idempotent value are accepted.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Looks up a cached timestamp. `None` means absent or expired.
    async fn get_value(&self, key: &str) -> Option<i64>;

    /// Stores a timestamp under `key` for at most `ttl`.
    async fn set_value(&self, key: &str, value: i64, ttl: Duration);
}

struct CacheEntry {
    value: i64,
    expires_at: Instant,
}

/// In-memory [`TokenCache`] with per-entry deadlines.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenCache for InMemoryCache {
    async fn get_value(&self, key: &str) -> Option<i64> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value)
    }

    async fn set_value(&self, key: &str, value: i64, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}
