//! # Auth Errors
//!
//! Error types for session establishment and the identity collaborator.

use thiserror::Error;

use crate::slot::SlotError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Session and identity errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Credentials were malformed (the directory does not verify secrets)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An operation needed a session principal and none is set
    #[error("No active session")]
    NoActivePrincipal,

    /// Principal slot could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 401,
            AuthError::NoActivePrincipal => 401,
            AuthError::StorageError(_) => 500,
        }
    }
}

impl From<SlotError> for AuthError {
    fn from(e: SlotError) -> Self {
        AuthError::StorageError(e.to_string())
    }
}
