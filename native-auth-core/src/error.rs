use thiserror::Error;

/// Detailed error type for native auth token operations.
///
/// The first five kinds describe an *invalid token* and are produced by the
/// validator in a fixed order, short-circuiting on the first failure. The
/// `Api` kind is different in nature: it means validity could not be
/// determined because the block index was unreachable or misbehaved, and it
/// is never normalized into one of the protocol kinds.
#[derive(Error, Debug, Clone)]
pub enum NativeAuthError {
    /// Token or token body failed structural decoding
    #[error("Malformed token: {reason}")]
    MalformedToken { reason: String },

    /// Host is present but not a member of the configured allowlist
    #[error("Host '{host}' is not accepted by this validator")]
    HostNotAccepted { host: String },

    /// The anchor block hash is unknown to the block index
    #[error("Block hash '{hash}' could not be resolved")]
    InvalidBlockHash { hash: String },

    /// The token's expiry instant is earlier than the latest block timestamp
    #[error("Token expired at {expires_at}, latest block timestamp is {latest}")]
    TokenExpired {
        /// Anchor timestamp plus TTL (Unix timestamp)
        expires_at: i64,
        /// Latest block timestamp when validation was attempted
        latest: i64,
    },

    /// Signature verification against the claimed address failed
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The block index request failed or returned an unexpected response
    #[error("Block index request failed: {reason}")]
    Api { reason: String },
}

impl NativeAuthError {
    // ===== Helper Methods for Common Error Checks =====

    /// Check if this error is a structural decode failure
    pub fn is_malformed(&self) -> bool {
        matches!(self, NativeAuthError::MalformedToken { .. })
    }

    /// Check if this error is due to token expiration
    pub fn is_expired(&self) -> bool {
        matches!(self, NativeAuthError::TokenExpired { .. })
    }

    /// Check if this error is a signature failure
    pub fn is_signature_error(&self) -> bool {
        matches!(self, NativeAuthError::InvalidSignature)
    }

    /// Check if this error is a transport failure rather than a verdict on
    /// the token itself
    pub fn is_api_error(&self) -> bool {
        matches!(self, NativeAuthError::Api { .. })
    }

    /// Get the expiry instant if this is an expiration error
    pub fn get_expiration_time(&self) -> Option<i64> {
        match self {
            NativeAuthError::TokenExpired { expires_at, .. } => Some(*expires_at),
            _ => None,
        }
    }

    // ===== Constructor Helper Methods =====

    /// Create a structural decode error
    pub fn malformed<S: Into<String>>(reason: S) -> Self {
        NativeAuthError::MalformedToken {
            reason: reason.into(),
        }
    }

    /// Create a block index transport error
    pub fn api<S: Into<String>>(reason: S) -> Self {
        NativeAuthError::Api {
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for NativeAuthError {
    fn from(err: reqwest::Error) -> Self {
        NativeAuthError::Api {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_predicates() {
        assert!(NativeAuthError::malformed("truncated").is_malformed());
        assert!(
            NativeAuthError::TokenExpired {
                expires_at: 10,
                latest: 11
            }
            .is_expired()
        );
        assert!(NativeAuthError::InvalidSignature.is_signature_error());
        assert!(NativeAuthError::api("connection refused").is_api_error());
        assert!(!NativeAuthError::api("connection refused").is_malformed());
    }

    #[test]
    fn test_expiration_time_accessor() {
        let err = NativeAuthError::TokenExpired {
            expires_at: 1_700_000_000,
            latest: 1_700_000_001,
        };
        assert_eq!(err.get_expiration_time(), Some(1_700_000_000));
        assert_eq!(NativeAuthError::InvalidSignature.get_expiration_time(), None);
    }
}
