use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use native_auth_core::{
    decode_bearer, decode_body, signable_message, BearerParts, FreshnessOracle, NativeAuthConfig,
    NativeAuthError, TokenBody,
};

use crate::crypto::{Ed25519Verifier, SignatureVerifier};

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Decoded account address the token was signed by
    pub address: String,
    /// Timestamp of the anchor block (Unix timestamp)
    pub issued: i64,
    /// `issued + ttl`, the instant through which the token is valid
    pub expires: i64,
    /// Host the token is addressed to
    pub host: String,
    /// Caller-supplied payload; absent when the token carried the
    /// empty-object sentinel
    pub extra_info: Option<Value>,
}

/// Server-side validator for native auth bearer tokens.
///
/// Checks run in a fixed order and short-circuit on the first failure:
/// bearer structure, body structure, host allowlist, anchor resolution,
/// freshness, signature. Each step is a named method below so the order
/// stays auditable. Block index transport failures propagate as
/// [`NativeAuthError::Api`] and are never folded into a token verdict.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use native_auth_core::{BlockIndexClient, InMemoryCache, NativeAuthConfig};
/// use native_auth_server::NativeAuthValidator;
///
/// # async fn validate(bearer: &str) -> Result<(), native_auth_core::NativeAuthError> {
/// let config = NativeAuthConfig::default()
///     .with_accepted_hosts(vec!["example.com".to_string()]);
/// let oracle = BlockIndexClient::from_config(&config)
///     .with_cache(Arc::new(InMemoryCache::new()));
/// let validator = NativeAuthValidator::new(config, Arc::new(oracle));
///
/// let result = validator.validate(bearer).await?;
/// println!("authenticated {} until {}", result.address, result.expires);
/// # Ok(())
/// # }
/// ```
pub struct NativeAuthValidator {
    config: NativeAuthConfig,
    oracle: Arc<dyn FreshnessOracle>,
    verifier: Arc<dyn SignatureVerifier>,
}

impl NativeAuthValidator {
    /// Creates a validator with the default ed25519 signature verifier.
    ///
    /// # Arguments
    /// * `config` - Accepted hosts and cache/expiry settings
    /// * `oracle` - Source of anchor and latest block timestamps
    pub fn new(config: NativeAuthConfig, oracle: Arc<dyn FreshnessOracle>) -> Self {
        Self {
            config,
            oracle,
            verifier: Arc::new(Ed25519Verifier),
        }
    }

    /// Replaces the signature verifier, e.g. with a chain-specific address
    /// codec.
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Validates a bearer token and returns its decoded claims.
    pub async fn validate(&self, token: &str) -> Result<ValidationResult, NativeAuthError> {
        let parts = decode_bearer(token)?;
        let body = decode_body(&parts.body)?;

        self.check_host(&body)?;
        let issued = self.resolve_anchor(&body).await?;
        let latest = self.oracle.latest_block_timestamp().await?;
        let expires = self.check_freshness(&body, issued, latest)?;
        self.check_signature(&parts)?;

        debug!(address = %parts.address, host = %body.host, expires, "token accepted");
        Ok(ValidationResult {
            address: parts.address,
            issued,
            expires,
            host: body.host,
            extra_info: body.extra_info,
        })
    }

    fn check_host(&self, body: &TokenBody) -> Result<(), NativeAuthError> {
        let accepted = &self.config.accepted_hosts;
        if !accepted.is_empty() && !accepted.iter().any(|host| host == &body.host) {
            return Err(NativeAuthError::HostNotAccepted {
                host: body.host.clone(),
            });
        }
        Ok(())
    }

    async fn resolve_anchor(&self, body: &TokenBody) -> Result<i64, NativeAuthError> {
        match self.oracle.block_timestamp(&body.block_hash).await? {
            Some(timestamp) => Ok(timestamp),
            None => Err(NativeAuthError::InvalidBlockHash {
                hash: body.block_hash.clone(),
            }),
        }
    }

    /// A token is valid through and including its expiry instant.
    fn check_freshness(
        &self,
        body: &TokenBody,
        issued: i64,
        latest: i64,
    ) -> Result<i64, NativeAuthError> {
        let expires = issued + i64::from(body.ttl);
        if expires < latest {
            return Err(NativeAuthError::TokenExpired {
                expires_at: expires,
                latest,
            });
        }
        Ok(expires)
    }

    /// Any failure here -- malformed hex included -- is a signature error,
    /// so tampering with the signature segment can never surface as a
    /// different error class.
    fn check_signature(&self, parts: &BearerParts) -> Result<(), NativeAuthError> {
        let Ok(signature) = hex::decode(&parts.signature_hex) else {
            return Err(NativeAuthError::InvalidSignature);
        };
        let message = signable_message(&parts.address, &parts.body);
        if !self.verifier.verify(&parts.address, &message, &signature) {
            return Err(NativeAuthError::InvalidSignature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ed25519_dalek::{Signer, SigningKey};
    use native_auth_core::{encode_body, encode_value};
    use serde_json::json;
    use std::collections::HashMap;

    /// Hermetic stand-in for the block index.
    struct FakeOracle {
        blocks: HashMap<String, i64>,
        latest: i64,
        fail: bool,
    }

    impl FakeOracle {
        fn new(latest: i64) -> Self {
            Self {
                blocks: HashMap::new(),
                latest,
                fail: false,
            }
        }

        fn with_block(mut self, hash: &str, timestamp: i64) -> Self {
            self.blocks.insert(hash.to_string(), timestamp);
            self
        }

        fn failing() -> Self {
            Self {
                blocks: HashMap::new(),
                latest: 0,
                fail: true,
            }
        }
    }

    #[async_trait]
    impl FreshnessOracle for FakeOracle {
        async fn block_timestamp(&self, hash: &str) -> Result<Option<i64>, NativeAuthError> {
            if self.fail {
                return Err(NativeAuthError::api("index unreachable"));
            }
            Ok(self.blocks.get(hash).copied())
        }

        async fn latest_block_timestamp(&self) -> Result<i64, NativeAuthError> {
            if self.fail {
                return Err(NativeAuthError::api("index unreachable"));
            }
            Ok(self.latest)
        }

        async fn latest_block_hash(&self) -> Result<String, NativeAuthError> {
            unreachable!("validator never fetches the latest hash")
        }
    }

    const ANCHOR_TS: i64 = 1_700_000_000;

    fn sample_hash() -> String {
        format!("b3d0{}27b4", "ab".repeat(28))
    }

    fn keypair() -> (SigningKey, String) {
        let signing = SigningKey::from_bytes(&[42u8; 32]);
        let address = hex::encode(signing.verifying_key().to_bytes());
        (signing, address)
    }

    /// Mints a fully signed bearer token the way an issuer would.
    fn mint(host: &str, hash: &str, ttl: u32, extra: Option<&Value>) -> (String, String) {
        let (signing, address) = keypair();
        let body = encode_body(host, hash, ttl, extra);
        let signature = signing.sign(&signable_message(&address, &body));
        let bearer = format!(
            "{}.{body}.{}",
            encode_value(&address),
            hex::encode(signature.to_bytes())
        );
        (address, bearer)
    }

    fn validator(oracle: FakeOracle) -> NativeAuthValidator {
        NativeAuthValidator::new(NativeAuthConfig::default(), Arc::new(oracle))
    }

    #[tokio::test]
    async fn test_valid_token_accepted() {
        let hash = sample_hash();
        let oracle = FakeOracle::new(ANCHOR_TS + 100).with_block(&hash, ANCHOR_TS);
        let (address, bearer) = mint("elrond.com", &hash, 86400, None);

        let result = validator(oracle)
            .validate(&bearer)
            .await
            .expect("valid token must be accepted");

        assert_eq!(result.address, address);
        assert_eq!(result.issued, ANCHOR_TS);
        assert_eq!(result.expires, ANCHOR_TS + 86400);
        assert_eq!(result.host, "elrond.com");
        assert_eq!(
            result.extra_info, None,
            "empty-object sentinel must be omitted, not an empty object"
        );
    }

    #[tokio::test]
    async fn test_extra_info_survives_validation() {
        let hash = sample_hash();
        let oracle = FakeOracle::new(ANCHOR_TS).with_block(&hash, ANCHOR_TS);
        let extra = json!({"session": "s1"});
        let (_, bearer) = mint("elrond.com", &hash, 60, Some(&extra));

        let result = validator(oracle).validate(&bearer).await.expect("accepted");
        assert_eq!(result.extra_info, Some(extra));
    }

    #[tokio::test]
    async fn test_malformed_token_rejected_first() {
        let oracle = FakeOracle::new(ANCHOR_TS);
        assert!(validator(oracle)
            .validate("not-a-token")
            .await
            .unwrap_err()
            .is_malformed());

        // Structurally broken body behind a well-formed outer split
        let oracle = FakeOracle::new(ANCHOR_TS);
        let token = format!("{}.only.two.segments.beef", encode_value("erd1alice"));
        assert!(validator(oracle)
            .validate(&token)
            .await
            .unwrap_err()
            .is_malformed());
    }

    #[tokio::test]
    async fn test_host_allowlist_enforced() {
        let hash = sample_hash();
        let oracle = FakeOracle::new(ANCHOR_TS).with_block(&hash, ANCHOR_TS);
        let (_, bearer) = mint("other.com", &hash, 60, None);

        let config =
            NativeAuthConfig::default().with_accepted_hosts(vec!["elrond.com".to_string()]);
        let err = NativeAuthValidator::new(config, Arc::new(oracle))
            .validate(&bearer)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NativeAuthError::HostNotAccepted { host } if host == "other.com"
        ));
    }

    #[tokio::test]
    async fn test_empty_allowlist_accepts_any_host() {
        let hash = sample_hash();
        let oracle = FakeOracle::new(ANCHOR_TS).with_block(&hash, ANCHOR_TS);
        let (_, bearer) = mint("whatever.example", &hash, 60, None);

        assert!(validator(oracle).validate(&bearer).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_anchor_hash_rejected() {
        let hash = sample_hash();
        let oracle = FakeOracle::new(ANCHOR_TS); // hash not registered
        let (_, bearer) = mint("elrond.com", &hash, 60, None);

        let err = validator(oracle).validate(&bearer).await.unwrap_err();
        assert!(matches!(
            err,
            NativeAuthError::InvalidBlockHash { hash: h } if h == hash
        ));
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_inclusive() {
        let hash = sample_hash();
        let (_, bearer) = mint("elrond.com", &hash, 60, None);

        // latest == issued + ttl: still valid
        let oracle = FakeOracle::new(ANCHOR_TS + 60).with_block(&hash, ANCHOR_TS);
        assert!(
            validator(oracle).validate(&bearer).await.is_ok(),
            "token is valid through the expiry instant"
        );

        // one second past: expired
        let oracle = FakeOracle::new(ANCHOR_TS + 61).with_block(&hash, ANCHOR_TS);
        let err = validator(oracle).validate(&bearer).await.unwrap_err();
        assert!(matches!(
            err,
            NativeAuthError::TokenExpired { expires_at, latest }
                if expires_at == ANCHOR_TS + 60 && latest == ANCHOR_TS + 61
        ));
    }

    #[tokio::test]
    async fn test_tampered_signature_is_signature_error() {
        let hash = sample_hash();
        let (_, bearer) = mint("elrond.com", &hash, 60, None);

        // Extra hex bytes appended to the signature segment
        let oracle = FakeOracle::new(ANCHOR_TS).with_block(&hash, ANCHOR_TS);
        let err = validator(oracle)
            .validate(&format!("{bearer}ff"))
            .await
            .unwrap_err();
        assert!(err.is_signature_error());

        // Non-hex garbage appended: still a signature error, never malformed
        let oracle = FakeOracle::new(ANCHOR_TS).with_block(&hash, ANCHOR_TS);
        let err = validator(oracle)
            .validate(&format!("{bearer}zz"))
            .await
            .unwrap_err();
        assert!(err.is_signature_error());
    }

    #[tokio::test]
    async fn test_signature_from_wrong_key_rejected() {
        let hash = sample_hash();
        let oracle = FakeOracle::new(ANCHOR_TS).with_block(&hash, ANCHOR_TS);

        // Sign with one key, claim another address
        let other = SigningKey::from_bytes(&[5u8; 32]);
        let claimed = hex::encode(
            SigningKey::from_bytes(&[6u8; 32])
                .verifying_key()
                .to_bytes(),
        );
        let body = encode_body("elrond.com", &hash, 60, None);
        let signature = other.sign(&signable_message(&claimed, &body));
        let bearer = format!(
            "{}.{body}.{}",
            encode_value(&claimed),
            hex::encode(signature.to_bytes())
        );

        let err = validator(oracle).validate(&bearer).await.unwrap_err();
        assert!(err.is_signature_error());
    }

    #[tokio::test]
    async fn test_host_checked_before_anchor_resolution() {
        // Both the host and the hash are bad; the host check must win.
        let hash = sample_hash();
        let oracle = FakeOracle::new(ANCHOR_TS); // hash unknown
        let (_, bearer) = mint("other.com", &hash, 60, None);

        let config =
            NativeAuthConfig::default().with_accepted_hosts(vec!["elrond.com".to_string()]);
        let err = NativeAuthValidator::new(config, Arc::new(oracle))
            .validate(&bearer)
            .await
            .unwrap_err();
        assert!(matches!(err, NativeAuthError::HostNotAccepted { .. }));
    }

    #[tokio::test]
    async fn test_expiry_checked_before_signature() {
        // Expired token with a tampered signature reports expiry.
        let hash = sample_hash();
        let oracle = FakeOracle::new(ANCHOR_TS + 1000).with_block(&hash, ANCHOR_TS);
        let (_, bearer) = mint("elrond.com", &hash, 60, None);

        let err = validator(oracle)
            .validate(&format!("{bearer}ff"))
            .await
            .unwrap_err();
        assert!(err.is_expired());
    }

    #[tokio::test]
    async fn test_index_failure_propagates_as_api_error() {
        let hash = sample_hash();
        let (_, bearer) = mint("elrond.com", &hash, 60, None);

        let err = validator(FakeOracle::failing())
            .validate(&bearer)
            .await
            .unwrap_err();
        assert!(
            err.is_api_error(),
            "transport failures must never become a token verdict"
        );
    }
}
