//! Wire codec for token bodies and bearer tokens.
//!
//! A token body is four dot-joined segments:
//! `base64(host).blockHash.ttl.base64(json(extraInfo))`. The block hash and
//! TTL travel verbatim; host and extra info are base64-encoded with the
//! standard alphabet, unpadded. A bearer token wraps a body in two more
//! dot-joined parts: `base64(address).tokenBody.hex(signature)` -- the body
//! is NOT re-encoded, so a bearer token contains five dots in total.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;

use crate::error::NativeAuthError;

/// Standard-alphabet base64, unpadded on encode. Decoding tolerates optional
/// padding but rejects any byte outside the alphabet.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Length of a block hash segment: 64 hexadecimal characters.
pub const BLOCK_HASH_LEN: usize = 64;

/// Logical fields of a token body.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBody {
    /// Identity of the resource server the token is addressed to
    pub host: String,
    /// Hex hash of the anchor block proving freshness
    pub block_hash: String,
    /// Token lifetime in seconds, added to the anchor timestamp
    pub ttl: u32,
    /// Caller-supplied payload; `None` when the body carried the
    /// empty-object sentinel
    pub extra_info: Option<Value>,
}

/// Top-level parts of a bearer token, split but not yet judged.
///
/// The signature stays as hex text here; it is only decoded by the
/// signature check, so that tampering with it surfaces as a signature
/// failure rather than a structural one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerParts {
    /// Decoded account address string
    pub address: String,
    /// The raw four-segment token body
    pub body: String,
    /// Hex-encoded signature segment
    pub signature_hex: String,
}

/// Base64-encodes a single token segment.
pub fn encode_value(value: &str) -> String {
    BASE64.encode(value)
}

/// Decodes a single base64 token segment into a string.
pub fn decode_value(segment: &str, what: &str) -> Result<String, NativeAuthError> {
    let bytes = BASE64
        .decode(segment)
        .map_err(|e| NativeAuthError::malformed(format!("{what} segment is not base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|_| NativeAuthError::malformed(format!("{what} segment is not valid UTF-8")))
}

/// Encodes a token body from its logical fields.
///
/// `extra_info = None` encodes the empty-object sentinel, the reserved
/// marker meaning "no extra info" on decode.
pub fn encode_body(host: &str, block_hash: &str, ttl: u32, extra_info: Option<&Value>) -> String {
    let encoded_host = encode_value(host);
    let extra_json = match extra_info {
        Some(value) => value.to_string(),
        None => "{}".to_string(),
    };
    let encoded_extra = encode_value(&extra_json);
    format!("{encoded_host}.{block_hash}.{ttl}.{encoded_extra}")
}

/// Splits a bearer token into its three top-level parts.
///
/// The address is everything before the first dot, the signature everything
/// after the last dot, and the body -- which contains dots of its own --
/// everything in between.
pub fn decode_bearer(token: &str) -> Result<BearerParts, NativeAuthError> {
    let first = token
        .find('.')
        .ok_or_else(|| NativeAuthError::malformed("expected three dot-separated parts"))?;
    let last = token.rfind('.').unwrap_or(first);
    if first == last {
        return Err(NativeAuthError::malformed(
            "expected three dot-separated parts",
        ));
    }

    let address = decode_value(&token[..first], "address")?;
    Ok(BearerParts {
        address,
        body: token[first + 1..last].to_string(),
        signature_hex: token[last + 1..].to_string(),
    })
}

/// Decodes a token body into its logical fields.
///
/// Decoding is strict: exactly four segments, base64 within the standard
/// alphabet, a 64-character hex block hash, a decimal TTL and JSON extra
/// info. Anything else is a structural error, never a silent default.
pub fn decode_body(body: &str) -> Result<TokenBody, NativeAuthError> {
    let segments: Vec<&str> = body.split('.').collect();
    let (encoded_host, block_hash, ttl_segment, encoded_extra) = match segments.as_slice() {
        [host, hash, ttl, extra] => (*host, *hash, *ttl, *extra),
        _ => {
            return Err(NativeAuthError::malformed(
                "token body must have four dot-separated segments",
            ))
        }
    };

    let host = decode_value(encoded_host, "host")?;

    if block_hash.len() != BLOCK_HASH_LEN || !block_hash.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(NativeAuthError::malformed(format!(
            "block hash segment is not a {BLOCK_HASH_LEN}-character hex string"
        )));
    }

    let ttl: u32 = ttl_segment
        .parse()
        .map_err(|_| NativeAuthError::malformed("ttl segment is not a decimal integer"))?;

    let extra_json = decode_value(encoded_extra, "extra info")?;
    let extra_value: Value = serde_json::from_str(&extra_json)
        .map_err(|e| NativeAuthError::malformed(format!("extra info segment is not JSON: {e}")))?;
    let extra_info = match &extra_value {
        Value::Object(map) if map.is_empty() => None,
        _ => Some(extra_value),
    };

    Ok(TokenBody {
        host,
        block_hash: block_hash.to_string(),
        ttl,
        extra_info,
    })
}

/// The exact bytes the key holder signs: the address string, the raw token
/// body, and a trailing `"{}"` literal.
///
/// The trailing literal is a fixed protocol constant, appended whether or
/// not the body carries extra info. It is not the extra-info payload;
/// changing it breaks compatibility with existing signers and validators.
pub fn signable_message(address: &str, body: &str) -> Vec<u8> {
    format!("{address}{body}{{}}").into_bytes()
}
