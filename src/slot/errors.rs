//! # Slot Errors

use thiserror::Error;

/// Result type for durable slot operations
pub type SlotResult<T> = Result<T, SlotError>;

/// Durable slot errors
#[derive(Debug, Clone, Error)]
pub enum SlotError {
    /// Key contains characters outside `[a-z0-9_-]`
    #[error("Invalid slot key: {0}")]
    InvalidKey(String),

    /// Underlying read/write failed
    #[error("Slot I/O error: {0}")]
    Io(String),

    /// Stored payload failed checksum verification
    #[error("Slot '{0}' is corrupted (checksum mismatch)")]
    Corrupted(String),

    /// Payload could not be encoded or decoded
    #[error("Slot serialization error: {0}")]
    Serialization(String),

    /// Slot refused the operation (poisoned lock, injected failure)
    #[error("Slot unavailable: {0}")]
    Unavailable(String),
}

impl SlotError {
    /// Returns whether the stored data itself is bad (as opposed to the medium)
    pub fn is_data_error(&self) -> bool {
        matches!(self, SlotError::Corrupted(_) | SlotError::Serialization(_))
    }
}

impl From<serde_json::Error> for SlotError {
    fn from(e: serde_json::Error) -> Self {
        SlotError::Serialization(e.to_string())
    }
}
