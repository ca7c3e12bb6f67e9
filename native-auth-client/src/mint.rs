use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use native_auth_core::{
    encode_body, encode_value, signable_message, FreshnessOracle, NativeAuthConfig,
    NativeAuthError,
};

/// Issuer-side encoder for native auth tokens.
///
/// Runs where the private key lives. [`initialize`](Self::initialize)
/// anchors an unsigned token body to the chain's current block; the caller
/// signs the bytes returned by [`signable_message`](Self::signable_message)
/// with its own key, then [`assemble`](Self::assemble) joins address, body
/// and signature into the final bearer token. Signing itself is an external
/// capability -- this type never sees a private key.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use native_auth_client::NativeAuthClient;
/// use native_auth_core::{BlockIndexClient, NativeAuthConfig};
///
/// # async fn issue() -> Result<(), native_auth_core::NativeAuthError> {
/// let config = NativeAuthConfig::new("example.com").with_ttl(300);
/// let oracle = Arc::new(BlockIndexClient::from_config(&config));
/// let client = NativeAuthClient::new(config, oracle);
///
/// let body = client.initialize(None).await?;
/// let message = client.signable_message("erd1alice", &body);
/// let signature_hex = sign_with_wallet(&message);
/// let bearer = client.assemble("erd1alice", &body, &signature_hex);
/// # Ok(())
/// # }
/// # fn sign_with_wallet(_message: &[u8]) -> String { unimplemented!() }
/// ```
pub struct NativeAuthClient {
    config: NativeAuthConfig,
    oracle: Arc<dyn FreshnessOracle>,
}

impl NativeAuthClient {
    /// Creates an encoder for the configured host and TTL.
    ///
    /// # Arguments
    /// * `config` - Host identity, TTL and API settings
    /// * `oracle` - Source of the latest block hash
    pub fn new(config: NativeAuthConfig, oracle: Arc<dyn FreshnessOracle>) -> Self {
        Self { config, oracle }
    }

    /// Builds an unsigned token body anchored to the latest block.
    ///
    /// The anchor hash is always fetched live; serving it from a cache
    /// would anchor tokens to stale blocks and defeat the freshness proof.
    ///
    /// # Arguments
    /// * `extra_info` - Optional payload carried inside the body; `None`
    ///   encodes the empty-object sentinel
    ///
    /// # Returns
    /// The four-segment token body, ready to be signed and assembled
    pub async fn initialize(&self, extra_info: Option<Value>) -> Result<String, NativeAuthError> {
        let block_hash = self.oracle.latest_block_hash().await?;
        debug!(%block_hash, host = %self.config.host, "anchoring token body");
        Ok(encode_body(
            &self.config.host,
            &block_hash,
            self.config.ttl_seconds,
            extra_info.as_ref(),
        ))
    }

    /// The bytes the key holder must sign for `body` presented by
    /// `address`.
    pub fn signable_message(&self, address: &str, body: &str) -> Vec<u8> {
        signable_message(address, body)
    }

    /// Assembles the final bearer token.
    ///
    /// Literal concatenation of the encoded address, the body as-is, and
    /// the hex signature. The signature is not validated here; proving it
    /// is the validator's job.
    pub fn assemble(&self, address: &str, body: &str, signature_hex: &str) -> String {
        format!("{}.{body}.{signature_hex}", encode_value(address))
    }
}
