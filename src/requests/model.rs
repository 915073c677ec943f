//! # Request Model
//!
//! A request owns its comments, attachments, and status history. Names and
//! ids of the people involved are snapshotted at the time they acted, so
//! history stays stable if a principal is renamed later.
//!
//! ## Invariants
//! - `status_history` is non-empty and starts with the creation status
//! - `status_history` is append-only and strictly time-ordered
//! - `status` equals the status of the last history entry
//! - `updated_at` is the time of the latest mutation and never precedes
//!   `created_at`

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::lifecycle::RequestStatus;
use crate::auth::principal::{Principal, Role};

/// Kind of administrative request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Transcript,
    GradeAppeal,
    Enrollment,
    Exemption,
    Other,
}

impl RequestType {
    pub const ALL: [RequestType; 5] = [
        RequestType::Transcript,
        RequestType::GradeAppeal,
        RequestType::Enrollment,
        RequestType::Exemption,
        RequestType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Transcript => "transcript",
            RequestType::GradeAppeal => "grade_appeal",
            RequestType::Enrollment => "enrollment",
            RequestType::Exemption => "exemption",
            RequestType::Other => "other",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown request type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            other => Err(format!("unknown urgency: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
    /// Opaque handle to externally stored bytes
    pub content_ref: String,
}

/// Attachment metadata supplied by the caller; bytes live elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDraft {
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub content_ref: String,
}

impl AttachmentDraft {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        size_bytes: u64,
        content_ref: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            size_bytes,
            content_ref: content_ref.into(),
        }
    }

    pub(crate) fn into_attachment(self, uploaded_at: DateTime<Utc>) -> Attachment {
        Attachment {
            id: Uuid::new_v4().to_string(),
            file_name: self.file_name,
            media_type: self.media_type,
            size_bytes: self.size_bytes,
            uploaded_at,
            content_ref: self.content_ref,
        }
    }
}

/// One entry of a request's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub status: RequestStatus,
    pub actor_name: String,
    pub changed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// What a student fills in when submitting a request.
///
/// `request_type` is optional so that a missing type is reported as a
/// validation failure rather than a decoding error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub title: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub request_type: Option<RequestType>,
    #[serde(default)]
    pub urgency: Urgency,
    /// Defaults to the requester's department
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentDraft>,
}

impl RequestDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        request_type: RequestType,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            request_type: Some(request_type),
            ..Default::default()
        }
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentDraft) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub urgency: Urgency,
    pub requester_id: String,
    pub requester_name: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub status_history: Vec<StatusEvent>,
}

impl Request {
    /// Build a freshly submitted request. The draft must already be validated.
    pub fn submitted(
        id: impl Into<String>,
        draft: RequestDraft,
        requester: &Principal,
        now: DateTime<Utc>,
    ) -> Self {
        let department = draft
            .department
            .filter(|d| !d.trim().is_empty())
            .or_else(|| requester.department.clone())
            .unwrap_or_default();

        Self {
            id: id.into(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            request_type: draft.request_type.unwrap_or(RequestType::Other),
            status: RequestStatus::Created,
            urgency: draft.urgency,
            requester_id: requester.id.clone(),
            requester_name: requester.display_name.clone(),
            department,
            created_at: now,
            updated_at: now,
            assignee: None,
            comments: Vec::new(),
            attachments: draft
                .attachments
                .into_iter()
                .map(|a| a.into_attachment(now))
                .collect(),
            status_history: vec![StatusEvent {
                status: RequestStatus::Created,
                actor_name: requester.display_name.clone(),
                changed_at: now,
                comment: None,
            }],
        }
    }

    /// Timestamp for the next mutation: the wall clock, nudged forward when
    /// it has not advanced past the previous mutation.
    pub fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        }
    }

    pub(crate) fn record_status(
        &mut self,
        status: RequestStatus,
        actor_name: &str,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.status_history.push(StatusEvent {
            status,
            actor_name: actor_name.to_string(),
            changed_at: at,
            comment,
        });
        self.status = status;
        self.updated_at = at;
    }

    pub(crate) fn record_comment(&mut self, author: &Principal, text: &str, at: DateTime<Utc>) -> &Comment {
        self.comments.push(Comment {
            id: Uuid::new_v4().to_string(),
            author_id: author.id.clone(),
            author_name: author.display_name.clone(),
            author_role: author.role,
            text: text.to_string(),
            created_at: at,
        });
        self.updated_at = at;
        &self.comments[self.comments.len() - 1]
    }

    pub(crate) fn record_attachment(&mut self, draft: AttachmentDraft, at: DateTime<Utc>) -> &Attachment {
        self.attachments.push(draft.into_attachment(at));
        self.updated_at = at;
        &self.attachments[self.attachments.len() - 1]
    }

    pub(crate) fn record_assignee(&mut self, assignee: &str, at: DateTime<Utc>) {
        self.assignee = Some(assignee.to_string());
        self.updated_at = at;
    }

    /// Check the structural invariants; returns the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let first = self
            .status_history
            .first()
            .ok_or_else(|| format!("request '{}' has an empty status history", self.id))?;

        if first.status != RequestStatus::Created {
            return Err(format!(
                "request '{}' history starts with '{}' instead of 'created'",
                self.id, first.status
            ));
        }

        if let Some(pair) = self
            .status_history
            .windows(2)
            .find(|pair| pair[1].changed_at <= pair[0].changed_at)
        {
            return Err(format!(
                "request '{}' history is not strictly ordered at '{}'",
                self.id, pair[1].status
            ));
        }

        let last = &self.status_history[self.status_history.len() - 1];
        if last.status != self.status {
            return Err(format!(
                "request '{}' status '{}' differs from last history entry '{}'",
                self.id, self.status, last.status
            ));
        }

        if self.updated_at < self.created_at {
            return Err(format!("request '{}' was updated before it was created", self.id));
        }

        if self.updated_at < last.changed_at {
            return Err(format!("request '{}' updatedAt precedes its last status change", self.id));
        }

        Ok(())
    }
}
