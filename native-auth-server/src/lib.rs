mod crypto;
mod inspect;
mod verify;

pub use crypto::{Ed25519Verifier, SignatureVerifier};
pub use inspect::{decode_token, DecodedToken};
pub use verify::{NativeAuthValidator, ValidationResult};

// Re-export commonly needed types from core
pub use native_auth_core::{
    BlockIndexClient, FreshnessOracle, InMemoryCache, NativeAuthConfig, NativeAuthError,
    TokenCache,
};
