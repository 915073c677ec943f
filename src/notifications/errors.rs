//! # Notification Errors

use thiserror::Error;

use crate::slot::SlotError;

/// Result type for notification operations
pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(String),

    /// Draft missing a recipient, title or message
    #[error("Invalid notification: {0}")]
    Invalid(String),

    /// Notification slot could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl NotificationError {
    pub fn status_code(&self) -> u16 {
        match self {
            NotificationError::NotFound(_) => 404,
            NotificationError::Invalid(_) => 400,
            NotificationError::StorageError(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            NotificationError::NotFound(_) => "NOT_FOUND",
            NotificationError::Invalid(_) => "VALIDATION_ERROR",
            NotificationError::StorageError(_) => "PERSISTENCE_FAILURE",
        }
    }
}

impl From<SlotError> for NotificationError {
    fn from(e: SlotError) -> Self {
        NotificationError::StorageError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(NotificationError::NotFound("n1".into()).status_code(), 404);
        assert_eq!(NotificationError::Invalid("x".into()).status_code(), 400);
        assert_eq!(NotificationError::StorageError("x".into()).status_code(), 500);
    }
}
