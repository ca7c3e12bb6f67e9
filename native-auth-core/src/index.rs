//! Client for the block index API, the source of block freshness.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::cache::{block_timestamp_key, TokenCache, LATEST_TIMESTAMP_KEY, LATEST_TIMESTAMP_TTL};
use crate::config::NativeAuthConfig;
use crate::error::NativeAuthError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of block freshness information.
///
/// The encoder and validator consume this seam; [`BlockIndexClient`] is the
/// HTTP implementation against a block index API.
#[async_trait]
pub trait FreshnessOracle: Send + Sync {
    /// Resolves a block hash to its timestamp. `Ok(None)` means the index
    /// does not know the hash -- a verdict on the hash, not a transport
    /// failure.
    async fn block_timestamp(&self, hash: &str) -> Result<Option<i64>, NativeAuthError>;

    /// Timestamp of the most recent block known to the index.
    async fn latest_block_timestamp(&self) -> Result<i64, NativeAuthError>;

    /// Hash of the most recent block. Never served from cache: encoders
    /// must anchor to a live block.
    async fn latest_block_hash(&self) -> Result<String, NativeAuthError>;
}

#[derive(Deserialize)]
struct BlockHashEntry {
    hash: String,
}

#[derive(Deserialize)]
struct BlockTimestampEntry {
    timestamp: i64,
}

/// HTTP client for the block index API with optional cache-then-network
/// lookups.
pub struct BlockIndexClient {
    api_url: String,
    http: reqwest::Client,
    cache: Option<Arc<dyn TokenCache>>,
    max_expiry: Duration,
}

impl BlockIndexClient {
    /// Creates a client for the given API base URL with no cache.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            http: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            cache: None,
            max_expiry: Duration::from_secs(u64::from(crate::config::DEFAULT_TTL_SECONDS)),
        }
    }

    /// Creates a client from a configuration.
    pub fn from_config(config: &NativeAuthConfig) -> Self {
        Self::new(config.api_url.clone()).with_max_expiry(Duration::from_secs(config.max_expiry_seconds))
    }

    /// Attaches a cache. Without one, every lookup hits the network.
    pub fn with_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the cache TTL ceiling for resolved block-hash timestamps.
    pub fn with_max_expiry(mut self, max_expiry: Duration) -> Self {
        self.max_expiry = max_expiry;
        self
    }

    async fn get_success(&self, url: &str) -> Result<reqwest::Response, NativeAuthError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NativeAuthError::api(format!(
                "unexpected status {status} from {url}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl FreshnessOracle for BlockIndexClient {
    async fn block_timestamp(&self, hash: &str) -> Result<Option<i64>, NativeAuthError> {
        let key = block_timestamp_key(hash);
        if let Some(cache) = &self.cache {
            if let Some(timestamp) = cache.get_value(&key).await {
                debug!(hash, timestamp, "block timestamp served from cache");
                return Ok(Some(timestamp));
            }
        }

        let url = format!("{}/blocks/{hash}?extract=timestamp", self.api_url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(hash, "block hash unknown to the index");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(NativeAuthError::api(format!(
                "unexpected status {status} from {url}"
            )));
        }

        let text = response.text().await?;
        let timestamp: i64 = text.trim().parse().map_err(|_| {
            NativeAuthError::api(format!("block timestamp response was not an integer: {text:?}"))
        })?;

        if let Some(cache) = &self.cache {
            cache.set_value(&key, timestamp, self.max_expiry).await;
        }
        Ok(Some(timestamp))
    }

    async fn latest_block_timestamp(&self) -> Result<i64, NativeAuthError> {
        if let Some(cache) = &self.cache {
            if let Some(timestamp) = cache.get_value(LATEST_TIMESTAMP_KEY).await {
                debug!(timestamp, "latest block timestamp served from cache");
                return Ok(timestamp);
            }
        }

        let url = format!("{}/blocks?size=1&fields=timestamp", self.api_url);
        let blocks: Vec<BlockTimestampEntry> = self.get_success(&url).await?.json().await?;
        let timestamp = blocks
            .first()
            .map(|block| block.timestamp)
            .ok_or_else(|| NativeAuthError::api("block index returned no blocks"))?;

        if let Some(cache) = &self.cache {
            cache
                .set_value(LATEST_TIMESTAMP_KEY, timestamp, LATEST_TIMESTAMP_TTL)
                .await;
        }
        Ok(timestamp)
    }

    async fn latest_block_hash(&self) -> Result<String, NativeAuthError> {
        let url = format!("{}/blocks?size=1&fields=hash", self.api_url);
        let blocks: Vec<BlockHashEntry> = self.get_success(&url).await?.json().await?;
        blocks
            .into_iter()
            .next()
            .map(|block| block.hash)
            .ok_or_else(|| NativeAuthError::api("block index returned no blocks"))
    }
}
