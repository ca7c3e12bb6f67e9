use serde_json::Value;

use native_auth_core::{decode_bearer, decode_body, NativeAuthError};

/// Structurally decoded bearer token, with no judgment on its validity.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// Decoded account address string
    pub address: String,
    /// Host the token is addressed to
    pub host: String,
    /// Hex hash of the anchor block
    pub block_hash: String,
    /// Token lifetime in seconds
    pub ttl: u32,
    /// Caller-supplied payload, absent for the empty-object sentinel
    pub extra_info: Option<Value>,
    /// Hex-encoded signature segment, unverified
    pub signature_hex: String,
}

/// Decodes a bearer token without consulting the block index or verifying
/// the signature.
///
/// Useful for logging, metrics labels and session lookups before (or
/// instead of) a full validation. This is NOT an authentication check --
/// nothing here proves the token was signed by the claimed address or that
/// its anchor block exists.
pub fn decode_token(token: &str) -> Result<DecodedToken, NativeAuthError> {
    let parts = decode_bearer(token)?;
    let body = decode_body(&parts.body)?;

    Ok(DecodedToken {
        address: parts.address,
        host: body.host,
        block_hash: body.block_hash,
        ttl: body.ttl,
        extra_info: body.extra_info,
        signature_hex: parts.signature_hex,
    })
}
