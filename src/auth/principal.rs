//! # Principal
//!
//! The authenticated actor behind every operation. A principal is
//! immutable for the lifetime of a session and replaced wholesale on
//! login/logout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of institutional roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    DepartmentHead,
    AcademicSecretary,
    Admin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Student,
        Role::Teacher,
        Role::DepartmentHead,
        Role::AcademicSecretary,
        Role::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::DepartmentHead => "department_head",
            Role::AcademicSecretary => "academic_secretary",
            Role::Admin => "admin",
        }
    }

    /// Staff is every role except student
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Student)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role: {}", s))
    }
}

/// Authenticated actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,

    pub display_name: String,

    /// Login handle the identity collaborator resolved this principal from
    pub email: String,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Student registration number, when the institution issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_matricule: Option<String>,
}

impl Principal {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: email.into(),
            role,
            department: None,
            external_matricule: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_matricule(mut self, matricule: impl Into<String>) -> Self {
        self.external_matricule = Some(matricule.into());
        self
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}
