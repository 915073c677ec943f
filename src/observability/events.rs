//! Observable events for acadreq
//!
//! Every state change the engine performs, and every refusal it issues,
//! maps to exactly one of these events. Events are explicit and typed.

use std::fmt;

/// Observable events in acadreq
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Session
    /// A principal was established for the session
    SessionStarted,
    /// A previously persisted principal was restored at bootstrap
    SessionRestored,
    /// The session principal was cleared
    SessionEnded,

    // Repository
    /// Request collection loaded from its slot
    RepositoryLoaded,
    /// Request collection seeded with the example dataset
    RepositorySeeded,

    // Lifecycle
    /// A new request was submitted
    RequestSubmitted,
    /// A status transition was recorded
    StatusChanged,
    /// A comment was appended
    CommentAdded,
    /// An attachment was appended
    AttachmentAdded,
    /// An assignee was set
    RequestAssigned,

    // Guard
    /// An operation or surface was refused
    AccessDenied,

    // Notifications
    /// Notification handed to the sink
    NotificationEmitted,
    /// Notification sink refused or failed
    NotificationFailed,

    // Persistence
    /// Durable slot read or write failed
    PersistenceFailed,
    /// Durable slot payload failed checksum verification
    SlotCorruption,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::SessionStarted => "SESSION_STARTED",
            Event::SessionRestored => "SESSION_RESTORED",
            Event::SessionEnded => "SESSION_ENDED",

            Event::RepositoryLoaded => "REPOSITORY_LOADED",
            Event::RepositorySeeded => "REPOSITORY_SEEDED",

            Event::RequestSubmitted => "REQUEST_SUBMITTED",
            Event::StatusChanged => "STATUS_CHANGED",
            Event::CommentAdded => "COMMENT_ADDED",
            Event::AttachmentAdded => "ATTACHMENT_ADDED",
            Event::RequestAssigned => "REQUEST_ASSIGNED",

            Event::AccessDenied => "ACCESS_DENIED",

            Event::NotificationEmitted => "NOTIFICATION_EMITTED",
            Event::NotificationFailed => "NOTIFICATION_FAILED",

            Event::PersistenceFailed => "PERSISTENCE_FAILED",
            Event::SlotCorruption => "SLOT_CORRUPTION",
        }
    }

    /// Returns true if this event reports something that did not happen as asked
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::PersistenceFailed | Event::SlotCorruption | Event::NotificationFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::SessionStarted,
            Event::SessionRestored,
            Event::SessionEnded,
            Event::RepositoryLoaded,
            Event::RepositorySeeded,
            Event::RequestSubmitted,
            Event::StatusChanged,
            Event::CommentAdded,
            Event::AttachmentAdded,
            Event::RequestAssigned,
            Event::AccessDenied,
            Event::NotificationEmitted,
            Event::NotificationFailed,
            Event::PersistenceFailed,
            Event::SlotCorruption,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::PersistenceFailed.is_failure());
        assert!(Event::SlotCorruption.is_failure());
        assert!(!Event::StatusChanged.is_failure());
        assert!(!Event::AccessDenied.is_failure());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::StatusChanged), "STATUS_CHANGED");
    }
}
