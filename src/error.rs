//! Error types
//!
//! Only generation errors reach callers. Storage errors are caught inside the
//! persistence layer, logged, and turned into degraded behaviour.

use thiserror::Error;

/// Level generation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// Levels up to the static table size are not generated
    #[error("level {0} belongs to the static table (generated levels start at 11)")]
    InvalidLevelNumber(u32),
}

/// Storage backend and save data failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend missing, denied, or over quota
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored payload could not be parsed
    #[error("malformed save data: {0}")]
    MalformedSaveData(#[source] serde_json::Error),

    /// State could not be turned into JSON
    #[error("failed to serialize save data: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
