//! Error types for the result store.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for result store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while persisting or reading a snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write error for {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read error for {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("deserialization error for {path}: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
