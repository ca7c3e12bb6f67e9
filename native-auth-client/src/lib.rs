mod mint;

pub use mint::NativeAuthClient;

// Re-export commonly needed types from core
pub use native_auth_core::{
    BlockIndexClient, FreshnessOracle, InMemoryCache, NativeAuthConfig, NativeAuthError,
    TokenCache,
};
