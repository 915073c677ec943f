//! Request Status State Machine
//!
//! - States are explicit and enumerable
//! - Legal transitions are a fixed table, independent of the actor
//! - Students never author a transition; submission seeds `created`
//! - No state is absolutely terminal: `archived` reopens to `pending`
//!
//! Finer role gating per target status is available through
//! [`TransitionPolicy`]; the default policy adds no restriction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::errors::{RequestError, RequestResult};
use crate::auth::guard::can_change_status;
use crate::auth::principal::{Principal, Role};

/// Request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Initial status assigned at submission
    Created,
    /// Waiting to be picked up again (put on hold, or reopened from archive)
    Pending,
    // legacy collections used "verify" and "processing" for review
    #[serde(alias = "verify", alias = "processing")]
    InReview,
    /// Requester must supply more information
    MoreInfo,
    #[serde(alias = "completed")]
    Approved,
    #[serde(alias = "failed")]
    Rejected,
    Archived,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 7] = [
        RequestStatus::Created,
        RequestStatus::Pending,
        RequestStatus::InReview,
        RequestStatus::MoreInfo,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Created => "created",
            RequestStatus::Pending => "pending",
            RequestStatus::InReview => "in_review",
            RequestStatus::MoreInfo => "more_info",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Archived => "archived",
        }
    }

    /// Legal next states from this state
    pub fn legal_next(&self) -> &'static [RequestStatus] {
        use RequestStatus::*;
        match self {
            Created | Pending => &[InReview, Approved, Rejected, MoreInfo],
            InReview => &[Approved, Rejected, MoreInfo, Pending],
            MoreInfo => &[InReview, Approved, Rejected, Pending],
            Approved | Rejected => &[Archived],
            Archived => &[Pending],
        }
    }

    pub fn can_transition_to(&self, target: RequestStatus) -> bool {
        self.legal_next().contains(&target)
    }

    /// Awaiting staff attention (`created` and `pending` both count)
    pub fn is_awaiting(&self) -> bool {
        matches!(self, RequestStatus::Created | RequestStatus::Pending)
    }

    /// Decision reached (approved or rejected)
    pub fn is_decided(&self) -> bool {
        matches!(self, RequestStatus::Approved | RequestStatus::Rejected)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown status: {}", s))
    }
}

/// Per-target role restrictions layered over the transition table
#[derive(Debug, Clone, Default)]
pub struct TransitionPolicy {
    restrictions: HashMap<RequestStatus, Vec<Role>>,
}

impl TransitionPolicy {
    /// Any staff role may drive any legal transition
    pub fn uniform() -> Self {
        Self::default()
    }

    /// Only `roles` may move a request into `target`
    pub fn restrict(mut self, target: RequestStatus, roles: &[Role]) -> Self {
        self.restrictions.insert(target, roles.to_vec());
        self
    }

    pub fn permits(&self, actor: &Principal, target: RequestStatus) -> bool {
        self.restrictions
            .get(&target)
            .map(|roles| actor.has_any_role(roles))
            .unwrap_or(true)
    }
}

/// Check that `actor` may move a request from `from` to `to`.
///
/// Authorization is checked before legality: a student is refused even for
/// transitions the table would reject anyway.
pub fn validate_transition(
    policy: &TransitionPolicy,
    actor: &Principal,
    from: RequestStatus,
    to: RequestStatus,
) -> RequestResult<()> {
    if !can_change_status(actor) {
        return Err(RequestError::Forbidden(format!(
            "role '{}' cannot change request status",
            actor.role
        )));
    }

    if !policy.permits(actor, to) {
        return Err(RequestError::Forbidden(format!(
            "role '{}' cannot move a request to '{}'",
            actor.role, to
        )));
    }

    if !from.can_transition_to(to) {
        return Err(RequestError::IllegalTransition { from, to });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestStatus::*;

    fn actor(role: Role) -> Principal {
        Principal::new("9", "Actor", "actor@univ.test", role)
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(Created.legal_next(), &[InReview, Approved, Rejected, MoreInfo]);
        assert_eq!(Pending.legal_next(), Created.legal_next());
        assert_eq!(InReview.legal_next(), &[Approved, Rejected, MoreInfo, Pending]);
        assert_eq!(MoreInfo.legal_next(), &[InReview, Approved, Rejected, Pending]);
        assert_eq!(Approved.legal_next(), &[Archived]);
        assert_eq!(Rejected.legal_next(), &[Archived]);
        assert_eq!(Archived.legal_next(), &[Pending]);
    }

    #[test]
    fn test_nothing_returns_to_created() {
        for status in RequestStatus::ALL {
            assert!(!status.can_transition_to(Created));
        }
    }

    #[test]
    fn test_approved_cannot_skip_archive() {
        assert!(!Approved.can_transition_to(Pending));
        assert!(Approved.can_transition_to(Archived));
        assert!(Archived.can_transition_to(Pending));
    }

    #[test]
    fn test_legacy_status_aliases() {
        let status: RequestStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(status, InReview);
        let status: RequestStatus = serde_json::from_str("\"verify\"").unwrap();
        assert_eq!(status, InReview);
        assert_eq!(serde_json::to_string(&InReview).unwrap(), "\"in_review\"");
    }

    #[test]
    fn test_student_forbidden_even_for_illegal_target() {
        let student = actor(Role::Student);
        let policy = TransitionPolicy::uniform();

        for from in RequestStatus::ALL {
            for to in RequestStatus::ALL {
                assert!(matches!(
                    validate_transition(&policy, &student, from, to),
                    Err(RequestError::Forbidden(_))
                ));
            }
        }
    }

    #[test]
    fn test_staff_limited_only_by_table() {
        let policy = TransitionPolicy::uniform();
        for role in [Role::Teacher, Role::DepartmentHead, Role::AcademicSecretary, Role::Admin] {
            assert!(validate_transition(&policy, &actor(role), Created, Approved).is_ok());
            assert!(matches!(
                validate_transition(&policy, &actor(role), Approved, Pending),
                Err(RequestError::IllegalTransition { from: Approved, to: Pending })
            ));
        }
    }

    #[test]
    fn test_restricted_policy() {
        let policy = TransitionPolicy::uniform().restrict(Approved, &[Role::DepartmentHead]);

        assert!(validate_transition(&policy, &actor(Role::DepartmentHead), InReview, Approved).is_ok());
        assert!(matches!(
            validate_transition(&policy, &actor(Role::Teacher), InReview, Approved),
            Err(RequestError::Forbidden(_))
        ));
        assert!(validate_transition(&policy, &actor(Role::Teacher), InReview, Rejected).is_ok());
    }
}
