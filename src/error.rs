//! Error types for the diagnostic.

use crate::types::Version;
use thiserror::Error;

/// Main error type for store and search operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store is locked by another process")]
    Locked,

    #[error("Version {requested} not found (retained range is {floor}..={latest})")]
    VersionNotFound {
        requested: Version,
        floor: Version,
        latest: Version,
    },

    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    #[error("No snapshot loaded; call load() before namespace()")]
    NoActiveSnapshot,

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Invalid store format: {0}")]
    InvalidFormat(String),

    #[error("Checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid version range: low {low} exceeds high {high}")]
    InvalidRange { low: Version, high: Version },

    #[error(
        "Predicate is not monotonic over [{low}, {high}]: \
         endpoint values are inverted for the requested orientation"
    )]
    MonotonicityViolation { low: Version, high: Version },

    #[error("Probe budget of {budget} exhausted before convergence")]
    ProbeBudgetExhausted { budget: u32 },
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for StoreError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for StoreError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        StoreError::Deserialization(e.to_string())
    }
}

/// Result type for store and search operations.
pub type Result<T> = std::result::Result<T, StoreError>;
