//! # Request Errors
//!
//! The five failure kinds every engine operation can return. No operation
//! retries; the caller decides what to show.

use thiserror::Error;

use super::lifecycle::RequestStatus;
use crate::slot::SlotError;

/// Result type for request operations
pub type RequestResult<T> = Result<T, RequestError>;

#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// Referenced request or principal is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authenticated but not authorized for the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Target status is not in the legal-next set
    #[error("Illegal transition from '{from}' to '{to}'")]
    IllegalTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    /// Durable slot read or write failed; in-memory state is unchanged
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl RequestError {
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::NotFound(_) => 404,
            RequestError::Forbidden(_) => 403,
            RequestError::Validation(_) => 400,
            RequestError::IllegalTransition { .. } => 409,
            RequestError::Persistence(_) => 500,
        }
    }

    /// Stable tag for presentation
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::NotFound(_) => "NOT_FOUND",
            RequestError::Forbidden(_) => "FORBIDDEN",
            RequestError::Validation(_) => "VALIDATION_ERROR",
            RequestError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            RequestError::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }

    pub(crate) fn request_not_found(id: &str) -> Self {
        RequestError::NotFound(format!("request '{}'", id))
    }
}

impl From<SlotError> for RequestError {
    fn from(e: SlotError) -> Self {
        RequestError::Persistence(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RequestError::request_not_found("1").status_code(), 404);
        assert_eq!(RequestError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(RequestError::Validation("x".into()).status_code(), 400);
        assert_eq!(
            RequestError::IllegalTransition {
                from: RequestStatus::Approved,
                to: RequestStatus::Pending
            }
            .status_code(),
            409
        );
        assert_eq!(RequestError::Persistence("x".into()).status_code(), 500);
    }

    #[test]
    fn test_messages_are_human_readable() {
        let err = RequestError::IllegalTransition {
            from: RequestStatus::Archived,
            to: RequestStatus::InReview,
        };
        assert_eq!(err.to_string(), "Illegal transition from 'archived' to 'in_review'");
        assert_eq!(err.kind(), "ILLEGAL_TRANSITION");
    }

    #[test]
    fn test_slot_errors_become_persistence_failures() {
        let err: RequestError = SlotError::Corrupted("requests".into()).into();
        assert_eq!(err.kind(), "PERSISTENCE_FAILURE");
    }
}
