//! Error types and error handling for Tessera.
//!
//! Every fallible operation in the crate returns [`Result`]. Per-chunk
//! embedding failures during indexing are logged and absorbed by the
//! pipeline; everything else propagates through this enum.

use thiserror::Error;

/// Result type alias for Tessera operations
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Main error type for Tessera
#[derive(Error, Debug)]
pub enum TesseraError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("Indexing failed: {0}")]
    IndexingFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl TesseraError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            TesseraError::InvalidArgument(_)
                | TesseraError::InvalidPath(_)
                | TesseraError::ConfigError(_)
        )
    }

    /// Check if the operation was stopped by a cancellation request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TesseraError::Cancelled)
    }

    /// Check if retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, TesseraError::EmbeddingFailed(_))
    }
}
