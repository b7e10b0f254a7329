//! Centralized serialization and deserialization functions.
//!
//! This module provides a unified interface for encoding and decoding
//! ledger values as JSON, with consistent error handling via snafu. JSON
//! keeps field names stable on the wire, which the other contracts in the
//! ledger application rely on when reading CSO state.

use serde::{Serialize, de::DeserializeOwned};
use snafu::Snafu;

/// Error type for codec operations.
#[derive(Debug, Snafu)]
pub enum CodecError {
    /// Encoding failed.
    #[snafu(display("Encoding failed: {source}"))]
    Encode {
        /// The underlying serde_json error.
        source: serde_json::Error,
    },

    /// Decoding failed.
    #[snafu(display("Decoding failed: {source}"))]
    Decode {
        /// The underlying serde_json error.
        source: serde_json::Error,
    },
}

/// Encodes a value to its ledger byte representation.
///
/// # Errors
///
/// Returns `CodecError::Encode` if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(|source| CodecError::Encode { source })
}

/// Decodes a ledger byte value.
///
/// # Errors
///
/// Returns `CodecError::Decode` if deserialization fails.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(|source| CodecError::Decode { source })
}
