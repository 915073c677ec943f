//! Observability subsystem for acadreq
//!
//! Structured JSON logging of typed lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on the operation being observed
//! 3. No background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use acadreq::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::StatusChanged, &[("request_id", "1"), ("to", "in_review")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    // sink failures are WARN, not ERROR
    let severity = if matches!(event, Event::NotificationFailed | Event::AccessDenied) {
        Severity::Warn
    } else if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::RepositoryLoaded);
        log_event(Event::SessionEnded);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("data_dir", "/tmp/test")]);
        log_event_with_fields(Event::PersistenceFailed, &[("key", "requests")]);
    }
}
