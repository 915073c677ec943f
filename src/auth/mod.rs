//! # acadreq Auth Module
//!
//! Principal model, the identity collaborator seam, the session principal
//! store, and the access guard that every read and write consults.

pub mod errors;
pub mod guard;
pub mod identity;
pub mod principal;
pub mod session;

pub use errors::{AuthError, AuthResult};
pub use guard::{can_access, can_change_status, can_view_request, check_access, GuardDecision, Resource};
pub use identity::{Credentials, DemoDirectory, IdentityProvider};
pub use principal::{Principal, Role};
pub use session::PrincipalStore;
