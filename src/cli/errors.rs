//! CLI-specific error types
//!
//! Every failure a command can hit collapses into a `CliError` carrying a
//! stable code for the JSON error envelope.

use std::fmt;
use std::io;

use crate::auth::AuthError;
use crate::notifications::NotificationError;
use crate::requests::RequestError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, data directory)
    IoError,
    /// Already initialized
    AlreadyInitialized,
    /// Not initialized
    NotInitialized,
    /// Credentials rejected by the identity collaborator
    AuthFailed,
    /// Command needs a session principal
    NotAuthenticated,
    NotFound,
    Forbidden,
    ValidationError,
    IllegalTransition,
    /// Durable slot read or write failed
    PersistenceFailure,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ACADREQ_CLI_CONFIG_ERROR",
            Self::IoError => "ACADREQ_CLI_IO_ERROR",
            Self::AlreadyInitialized => "ACADREQ_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "ACADREQ_CLI_NOT_INITIALIZED",
            Self::AuthFailed => "ACADREQ_CLI_AUTH_FAILED",
            Self::NotAuthenticated => "ACADREQ_CLI_NOT_AUTHENTICATED",
            Self::NotFound => "ACADREQ_CLI_NOT_FOUND",
            Self::Forbidden => "ACADREQ_CLI_FORBIDDEN",
            Self::ValidationError => "ACADREQ_CLI_VALIDATION_ERROR",
            Self::IllegalTransition => "ACADREQ_CLI_ILLEGAL_TRANSITION",
            Self::PersistenceFailure => "ACADREQ_CLI_PERSISTENCE_FAILURE",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Already initialized
    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    /// Not initialized
    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'acadreq init' first.",
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<RequestError> for CliError {
    fn from(e: RequestError) -> Self {
        let code = match e {
            RequestError::NotFound(_) => CliErrorCode::NotFound,
            RequestError::Forbidden(_) => CliErrorCode::Forbidden,
            RequestError::Validation(_) => CliErrorCode::ValidationError,
            RequestError::IllegalTransition { .. } => CliErrorCode::IllegalTransition,
            RequestError::Persistence(_) => CliErrorCode::PersistenceFailure,
        };
        Self::new(code, e.to_string())
    }
}

impl From<AuthError> for CliError {
    fn from(e: AuthError) -> Self {
        let code = match e {
            AuthError::InvalidCredentials => CliErrorCode::AuthFailed,
            AuthError::NoActivePrincipal => CliErrorCode::NotAuthenticated,
            AuthError::StorageError(_) => CliErrorCode::PersistenceFailure,
        };
        Self::new(code, e.to_string())
    }
}

impl From<NotificationError> for CliError {
    fn from(e: NotificationError) -> Self {
        let code = match e {
            NotificationError::NotFound(_) => CliErrorCode::NotFound,
            NotificationError::Invalid(_) => CliErrorCode::ValidationError,
            NotificationError::StorageError(_) => CliErrorCode::PersistenceFailure,
        };
        Self::new(code, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
