//! # Error Hierarchy
//!
//! Structured error types shared by the rgdm crates, built with `thiserror`.
//!
//! Each variant carries the offending input so that operators can diagnose a
//! rejected payload from the log line alone.

use thiserror::Error;

/// Top-level error type for the rgdm core.
#[derive(Error, Debug)]
pub enum RgdmError {
    /// Canonicalization failure during hash computation.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Domain primitive or payload validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// NaN and infinities have no JSON representation.
    #[error("non-finite number cannot be canonicalized: {0}")]
    NonFiniteNumber(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for domain primitives and credential payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address is not `0x` followed by 40 hex characters.
    #[error("invalid address: \"{0}\" (expected 0x followed by 40 hex characters)")]
    InvalidAddress(String),

    /// Digest is not `0x` followed by 64 hex characters.
    #[error("invalid digest: \"{0}\" (expected 0x followed by 64 hex characters)")]
    InvalidDigest(String),

    /// The credential payload is missing a required field or has the wrong shape.
    #[error("malformed presentation: {0}")]
    MalformedPresentation(String),
}
