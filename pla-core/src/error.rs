//! Error types for pla-core

use thiserror::Error;

/// Result type alias for PLA operations
pub type Result<T> = std::result::Result<T, PlaError>;

/// PLA error types
#[derive(Error, Debug)]
pub enum PlaError {
    /// Malformed arguments handed to an entry point
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Path search refused because the tree holds too many paths
    #[error("Path search too large: {paths} paths exceed the limit of {limit}")]
    SearchTooLarge { paths: u128, limit: u128 },

    /// Path search observed a cancellation request
    #[error("Path search cancelled")]
    Cancelled,

    /// Invalid encoded block
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Checksum mismatch in an encoded block
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlaError::Io(_))
    }

    /// Check if error indicates a corrupted block
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            PlaError::InvalidFormat(_) | PlaError::ChecksumMismatch { .. }
        )
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PlaError::InvalidInput(msg.into())
    }
}
