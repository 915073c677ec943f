//! acadreq - Academic request lifecycle and access-control engine
//!
//! Students submit administrative requests; staff move them through a
//! fixed status state machine. Every read and write consults the access
//! guard, every mutation is persisted before it becomes visible, and the
//! requester is notified of staff activity.

pub mod auth;
pub mod cli;
pub mod notifications;
pub mod observability;
pub mod requests;
pub mod slot;
