//! # Session
//!
//! The principal store: holds the current authenticated actor for one
//! session and persists it in the `principal` slot so a restarted process
//! resumes the same session.
//!
//! ## Invariants
//! - The principal is replaced wholesale, never edited in place
//! - Persistence happens before the in-memory swap; a failed write leaves
//!   the previous principal active

use std::sync::Arc;

use super::errors::{AuthError, AuthResult};
use super::identity::{Credentials, IdentityProvider};
use super::principal::{Principal, Role};
use crate::observability::{log_event_with_fields, Event};
use crate::slot::{load_json, save_json, DurableSlot, PRINCIPAL_KEY};

/// Session-scoped principal store
#[derive(Debug)]
pub struct PrincipalStore {
    slot: Arc<dyn DurableSlot>,
    current: Option<Principal>,
}

impl PrincipalStore {
    /// Restore the session from the slot, if a principal was persisted.
    pub fn bootstrap(slot: Arc<dyn DurableSlot>) -> AuthResult<Self> {
        let current: Option<Principal> = load_json(slot.as_ref(), PRINCIPAL_KEY)?;

        if let Some(principal) = &current {
            log_event_with_fields(
                Event::SessionRestored,
                &[("principal_id", principal.id.as_str()), ("role", principal.role.as_str())],
            );
        }

        Ok(Self { slot, current })
    }

    /// Store with no principal and nothing restored
    pub fn empty(slot: Arc<dyn DurableSlot>) -> Self {
        Self {
            slot,
            current: None,
        }
    }

    pub fn current_principal(&self) -> Option<&Principal> {
        self.current.as_ref()
    }

    /// The current principal, or `NoActivePrincipal`
    pub fn require_principal(&self) -> AuthResult<&Principal> {
        self.current.as_ref().ok_or(AuthError::NoActivePrincipal)
    }

    /// False when no principal is set
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.current
            .as_ref()
            .map(|principal| principal.has_any_role(roles))
            .unwrap_or(false)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Authenticate through `provider` and make the result the session principal
    pub fn login<P: IdentityProvider + ?Sized>(
        &mut self,
        provider: &P,
        credentials: &Credentials,
    ) -> AuthResult<&Principal> {
        let principal = provider.authenticate(credentials)?;
        self.establish(principal)
    }

    /// Replace the session principal with one supplied by an external collaborator
    pub fn establish(&mut self, principal: Principal) -> AuthResult<&Principal> {
        save_json(self.slot.as_ref(), PRINCIPAL_KEY, &principal)?;

        log_event_with_fields(
            Event::SessionStarted,
            &[("principal_id", principal.id.as_str()), ("role", principal.role.as_str())],
        );

        Ok(&*self.current.insert(principal))
    }

    /// Clear the session principal
    pub fn logout(&mut self) -> AuthResult<()> {
        self.slot.remove(PRINCIPAL_KEY)?;

        if let Some(previous) = self.current.take() {
            log_event_with_fields(Event::SessionEnded, &[("principal_id", previous.id.as_str())]);
        }

        Ok(())
    }
}
