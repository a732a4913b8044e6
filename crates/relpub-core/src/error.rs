//! Error types for the relpub core data model.

use thiserror::Error;

/// Errors produced while constructing or parsing core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid {algorithm} digest: expected {expected} hex characters, got {got}")]
    InvalidDigestLength {
        algorithm: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid hex in digest: {0}")]
    InvalidDigestHex(String),

    #[error("invalid date token {0:?}: expected 8 digits (YYYYMMDD)")]
    InvalidDateToken(String),

    #[error("unknown variant tag: {0:?}")]
    UnknownVariantTag(String),

    #[error("unsupported manifest schema version: {0:?}")]
    UnsupportedSchema(String),

    #[error("manifest parse error: {0}")]
    Parse(String),

    #[error("manifest encoding error: {0}")]
    Encode(String),
}
