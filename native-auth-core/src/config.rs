//! Configuration shared by the encoder and validator halves.

/// Default block index API base URL.
pub const DEFAULT_API_URL: &str = "https://api.elrond.com";

/// Default token lifetime, one day.
pub const DEFAULT_TTL_SECONDS: u32 = 86_400;

/// Recognized configuration for native auth tokens.
///
/// The cache implementation is injected separately (see
/// [`crate::cache::TokenCache`]) -- it is a capability, not data.
#[derive(Debug, Clone)]
pub struct NativeAuthConfig {
    /// Identity string the encoder embeds as the token's host
    pub host: String,
    /// Base URL of the block index API
    pub api_url: String,
    /// Token lifetime in seconds
    pub ttl_seconds: u32,
    /// Hosts the validator accepts; empty accepts any host
    pub accepted_hosts: Vec<String>,
    /// Cache TTL ceiling, in seconds, for resolved block-hash timestamps
    pub max_expiry_seconds: u64,
}

impl Default for NativeAuthConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            ttl_seconds: DEFAULT_TTL_SECONDS,
            accepted_hosts: Vec::new(),
            max_expiry_seconds: u64::from(DEFAULT_TTL_SECONDS),
        }
    }
}

impl NativeAuthConfig {
    /// Creates a configuration for the given host with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Sets the block index API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets the token lifetime in seconds.
    pub fn with_ttl(mut self, ttl_seconds: u32) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Sets the validator's host allowlist. An empty list accepts any host.
    pub fn with_accepted_hosts(mut self, hosts: Vec<String>) -> Self {
        self.accepted_hosts = hosts;
        self
    }

    /// Sets the cache TTL ceiling for resolved block-hash timestamps.
    pub fn with_max_expiry(mut self, max_expiry_seconds: u64) -> Self {
        self.max_expiry_seconds = max_expiry_seconds;
        self
    }
}
