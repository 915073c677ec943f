//! # acadreq Notifications
//!
//! The sink the lifecycle engine hands notifications to, and the bundled
//! notification center that stores them per recipient.
//!
//! Emission is fire-and-forget from the engine's point of view: a sink
//! failure is logged and never undoes the mutation that caused it.

mod center;
mod errors;
pub mod templates;

pub use center::NotificationCenter;
pub use errors::{NotificationError, NotificationResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a producer hands to the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub recipient_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A stored notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Receiver of notifications produced by the lifecycle engine
pub trait NotificationSink: Send + Sync + std::fmt::Debug {
    fn emit(&self, draft: NotificationDraft) -> NotificationResult<()>;
}

/// Sink that accepts and discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl NotificationSink for DiscardSink {
    fn emit(&self, _draft: NotificationDraft) -> NotificationResult<()> {
        Ok(())
    }
}
