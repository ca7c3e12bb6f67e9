//! Signature verification capability.
//!
//! Verifying a bearer token means checking a signature against the public
//! key behind the claimed account address. How an address maps to a key is
//! chain-specific, so the validator treats the whole step as an opaque
//! capability behind [`SignatureVerifier`].

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Opaque signature-checking capability: message bytes, the claimed
/// address, and the signature bytes go in; a verdict comes out.
///
/// Implementations must not panic on malformed input -- an address that
/// maps to no key, or a signature of the wrong length, is simply `false`.
pub trait SignatureVerifier: Send + Sync {
    /// Returns whether `signature` is a valid signature over `message` by
    /// the key behind `address`.
    fn verify(&self, address: &str, message: &[u8], signature: &[u8]) -> bool;
}

/// Default verifier: the address string is the hex encoding of a 32-byte
/// ed25519 public key.
///
/// Chains with their own account encoding (bech32 and friends) plug in a
/// different [`SignatureVerifier`] that carries the chain's derivation
/// rules; those rules are an integration point, not reimplemented here.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, address: &str, message: &[u8], signature: &[u8]) -> bool {
        let Ok(key_bytes) = hex::decode(address) else {
            return false;
        };
        let Ok(key_bytes) = <[u8; 32]>::try_from(key_bytes) else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify(message, &signature).is_ok()
    }
}
