//! # Access Guard
//!
//! Pure decision functions over the session principal. Nothing here reads
//! storage or mutates state; the presentation layer and the request engine
//! both call in before acting.
//!
//! ## Rules
//! - Anonymous callers reach only the auth-entry surfaces (and the
//!   not-found page)
//! - Any authenticated principal reaches the self-service surfaces
//! - Administrative surfaces require membership in a per-surface role set

use super::principal::{Principal, Role};
use crate::requests::model::Request;

/// Roles admitted to the request-management dashboard
pub const REQUEST_MANAGEMENT_ROLES: &[Role] =
    &[Role::Admin, Role::AcademicSecretary, Role::DepartmentHead];

/// Roles admitted to user management
pub const USER_MANAGEMENT_ROLES: &[Role] = &[Role::Admin];

/// Navigation target the presentation layer may ask about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Login,
    Register,
    Dashboard,
    Requests,
    NewRequest,
    RequestDetail(String),
    Profile,
    Settings,
    RequestManagement,
    UserManagement,
    CreateUser,
    NotFound,
}

/// Which audience a surface belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    AuthEntry,
    SelfService,
    Administrative(&'static [Role]),
    Public,
}

impl Resource {
    /// Map a navigation path to a resource. Unknown paths map to `NotFound`.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Resource::Dashboard,
            ["login"] => Resource::Login,
            ["register"] => Resource::Register,
            ["dashboard"] => Resource::Dashboard,
            ["requests"] => Resource::Requests,
            ["requests", "new"] => Resource::NewRequest,
            ["requests", id] => Resource::RequestDetail((*id).to_string()),
            ["profile"] => Resource::Profile,
            ["settings"] => Resource::Settings,
            ["AdminDashboard"] => Resource::RequestManagement,
            ["admin", "users"] => Resource::UserManagement,
            ["admin", "users", "create"] => Resource::CreateUser,
            _ => Resource::NotFound,
        }
    }

    pub fn surface(&self) -> Surface {
        match self {
            Resource::Login | Resource::Register => Surface::AuthEntry,
            Resource::Dashboard
            | Resource::Requests
            | Resource::NewRequest
            | Resource::RequestDetail(_)
            | Resource::Profile
            | Resource::Settings => Surface::SelfService,
            Resource::RequestManagement => Surface::Administrative(REQUEST_MANAGEMENT_ROLES),
            Resource::UserManagement | Resource::CreateUser => {
                Surface::Administrative(USER_MANAGEMENT_ROLES)
            }
            Resource::NotFound => Surface::Public,
        }
    }
}

/// Outcome of a navigation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Denied; the caller should send the user to this path
    Redirect(&'static str),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Decide whether `principal` may reach `resource`, and where to send them if not.
pub fn check_access(resource: &Resource, principal: Option<&Principal>) -> GuardDecision {
    match (resource.surface(), principal) {
        (Surface::Public, _) | (Surface::AuthEntry, _) => GuardDecision::Allow,
        (_, None) => GuardDecision::Redirect("/login"),
        (Surface::SelfService, Some(_)) => GuardDecision::Allow,
        (Surface::Administrative(roles), Some(principal)) => {
            if principal.has_any_role(roles) {
                GuardDecision::Allow
            } else {
                GuardDecision::Redirect("/dashboard")
            }
        }
    }
}

pub fn can_access(resource: &Resource, principal: Option<&Principal>) -> bool {
    check_access(resource, principal).is_allowed()
}

/// The single check gating per-request reads
pub fn can_view_request(principal: &Principal, request: &Request) -> bool {
    !principal.is_student() || request.requester_id == principal.id
}

/// Students never author status transitions
pub fn can_change_status(principal: &Principal) -> bool {
    principal.role.is_staff()
}
