//! # Native Auth Core
//!
//! Shared types and utilities for the native auth token crates.
//!
//! Native auth tokens bind a blockchain account address to a host and a
//! recent block, proven by a signature from the account's key instead of a
//! centralized session store. This crate provides the pieces both halves of
//! the protocol share:
//!
//! - Token body and bearer token codec
//! - Error taxonomy
//! - Configuration
//! - Pluggable timestamp cache with an in-memory default
//! - Block index ("freshness oracle") client

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod index;

pub use cache::{
    block_timestamp_key, InMemoryCache, TokenCache, LATEST_TIMESTAMP_KEY, LATEST_TIMESTAMP_TTL,
};
pub use codec::{
    decode_bearer, decode_body, encode_body, encode_value, signable_message, BearerParts,
    TokenBody, BLOCK_HASH_LEN,
};
pub use config::{NativeAuthConfig, DEFAULT_API_URL, DEFAULT_TTL_SECONDS};
pub use error::NativeAuthError;
pub use index::{BlockIndexClient, FreshnessOracle};
