//! # Identity collaborator
//!
//! Turns login credentials into a [`Principal`]. Credential verification
//! belongs to the identity provider; the engine only consumes the
//! resulting principal.

use serde::Deserialize;

use super::errors::{AuthError, AuthResult};
use super::principal::{Principal, Role};

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Identity provider trait
pub trait IdentityProvider: Send + Sync {
    /// Resolve credentials to an authenticated principal
    fn authenticate(&self, credentials: &Credentials) -> AuthResult<Principal>;
}

/// Demonstration directory with one principal per role.
///
/// The email handle picks the principal (`admin`, `teacher`, `head`,
/// `secretary`, anything else resolves to the student). Passwords are
/// ignored.
#[derive(Debug, Default, Clone)]
pub struct DemoDirectory;

impl DemoDirectory {
    pub fn new() -> Self {
        Self
    }

    /// The student every seeded request belongs to
    pub fn student(email: &str) -> Principal {
        Principal::new("5", "Student User", email, Role::Student)
            .with_matricule("19S2189")
            .with_department("Computer Science")
    }
}

impl IdentityProvider for DemoDirectory {
    fn authenticate(&self, credentials: &Credentials) -> AuthResult<Principal> {
        let email = credentials.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidCredentials);
        }

        let principal = if email.contains("admin") {
            Principal::new("1", "Admin User", email, Role::Admin)
        } else if email.contains("teacher") {
            Principal::new("2", "Teacher User", email, Role::Teacher)
                .with_department("Computer Science")
        } else if email.contains("head") {
            Principal::new("3", "Department Head", email, Role::DepartmentHead)
                .with_department("Computer Science")
        } else if email.contains("secretary") {
            Principal::new("4", "Academic Secretary", email, Role::AcademicSecretary)
        } else {
            Self::student(email)
        };

        Ok(principal)
    }
}
