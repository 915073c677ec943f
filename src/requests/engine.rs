//! # Lifecycle Engine
//!
//! Every request mutation goes through here. The engine checks the actor,
//! validates input, drives the repository's copy-persist-commit cycle, and
//! tells the requester about staff activity through the notification sink.
//!
//! ## Ordering of checks
//! - `request_status_change`: not found, forbidden, illegal transition
//! - `add_comment`, `add_attachment`: validation, not found, forbidden
//! - `assign_request`: forbidden, validation, not found
//! - `submit_request`: forbidden, validation
//!
//! Notifications are sent only after the mutation is durable. A sink
//! failure is logged and swallowed.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::errors::{RequestError, RequestResult};
use super::lifecycle::{validate_transition, RequestStatus, TransitionPolicy};
use super::model::{Attachment, AttachmentDraft, Comment, Request, RequestDraft};
use super::query::{self, FilterCriteria, RequestStatistics, StatusCounts};
use super::repository::RequestRepository;
use crate::auth::guard::{can_change_status, can_view_request, REQUEST_MANAGEMENT_ROLES};
use crate::auth::principal::Principal;
use crate::notifications::{templates, NotificationDraft, NotificationSink};
use crate::observability::{log_event_with_fields, Event};

/// Source of "now" for every recorded mutation
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
pub struct LifecycleEngine {
    repository: RequestRepository,
    notifier: Arc<dyn NotificationSink>,
    policy: TransitionPolicy,
    clock: Arc<dyn Clock>,
}

impl LifecycleEngine {
    pub fn new(repository: RequestRepository, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            repository,
            notifier,
            policy: TransitionPolicy::uniform(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn repository(&self) -> &RequestRepository {
        &self.repository
    }

    pub fn policy(&self) -> &TransitionPolicy {
        &self.policy
    }

    /// Create a request on behalf of the student submitting it
    pub fn submit_request(&self, draft: RequestDraft, requester: &Principal) -> RequestResult<Request> {
        if !requester.is_student() {
            return Err(self.denied(requester, "submit", format!(
                "role '{}' cannot submit requests",
                requester.role
            )));
        }

        if draft.title.trim().is_empty() {
            return Err(RequestError::Validation("title is required".into()));
        }
        if draft.description.trim().is_empty() {
            return Err(RequestError::Validation("description is required".into()));
        }
        if draft.request_type.is_none() {
            return Err(RequestError::Validation("type is required".into()));
        }
        for attachment in &draft.attachments {
            validate_attachment(attachment)?;
        }

        let request = Request::submitted(Uuid::new_v4().to_string(), draft, requester, self.clock.now());
        self.repository.insert(request.clone())?;

        log_event_with_fields(
            Event::RequestSubmitted,
            &[
                ("request_id", request.id.as_str()),
                ("requester_id", requester.id.as_str()),
                ("type", request.request_type.as_str()),
            ],
        );

        Ok(request)
    }

    /// Move a request to `target`, recording who did it and why
    pub fn request_status_change(
        &self,
        request_id: &str,
        target: RequestStatus,
        actor: &Principal,
        comment: Option<&str>,
    ) -> RequestResult<Request> {
        let comment = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let mut from = target;

        let result = self.repository.update(request_id, |request| {
            from = request.status;
            validate_transition(&self.policy, actor, request.status, target)?;
            let at = request.next_timestamp(self.clock.now());
            request.record_status(target, &actor.display_name, comment, at);
            Ok(())
        });

        let updated = match result {
            Ok(updated) => updated,
            Err(RequestError::Forbidden(reason)) => {
                return Err(self.denied(actor, "change_status", reason));
            }
            Err(e) => return Err(e),
        };

        log_event_with_fields(
            Event::StatusChanged,
            &[
                ("request_id", updated.id.as_str()),
                ("from", from.as_str()),
                ("to", target.as_str()),
                ("actor_id", actor.id.as_str()),
            ],
        );

        if !actor.is_student() {
            self.notify(templates::status_changed(&updated, &actor.display_name));
        }

        Ok(updated)
    }

    pub fn add_comment(&self, request_id: &str, author: &Principal, text: &str) -> RequestResult<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RequestError::Validation("comment text is required".into()));
        }

        let updated = self.update_visible(request_id, author, "comment", |request| {
            let at = request.next_timestamp(self.clock.now());
            request.record_comment(author, text, at);
            Ok(())
        })?;

        let comment = updated
            .comments
            .last()
            .cloned()
            .ok_or_else(|| RequestError::Persistence("comment was not recorded".into()))?;

        log_event_with_fields(
            Event::CommentAdded,
            &[
                ("request_id", updated.id.as_str()),
                ("comment_id", comment.id.as_str()),
                ("author_id", author.id.as_str()),
            ],
        );

        if !author.is_student() {
            self.notify(templates::comment_added(&updated, &author.display_name));
        }

        Ok(comment)
    }

    pub fn add_attachment(
        &self,
        request_id: &str,
        uploader: &Principal,
        draft: AttachmentDraft,
    ) -> RequestResult<Attachment> {
        validate_attachment(&draft)?;

        let updated = self.update_visible(request_id, uploader, "attach", |request| {
            let at = request.next_timestamp(self.clock.now());
            request.record_attachment(draft, at);
            Ok(())
        })?;

        let attachment = updated
            .attachments
            .last()
            .cloned()
            .ok_or_else(|| RequestError::Persistence("attachment was not recorded".into()))?;

        log_event_with_fields(
            Event::AttachmentAdded,
            &[
                ("request_id", updated.id.as_str()),
                ("attachment_id", attachment.id.as_str()),
                ("uploader_id", uploader.id.as_str()),
            ],
        );

        if !uploader.is_student() {
            self.notify(templates::attachment_added(
                &updated,
                &uploader.display_name,
                &attachment.file_name,
            ));
        }

        Ok(attachment)
    }

    /// Record who is handling the request
    pub fn assign_request(&self, request_id: &str, actor: &Principal, assignee: &str) -> RequestResult<Request> {
        if !can_change_status(actor) {
            return Err(self.denied(actor, "assign", format!(
                "role '{}' cannot assign requests",
                actor.role
            )));
        }

        let assignee = assignee.trim();
        if assignee.is_empty() {
            return Err(RequestError::Validation("assignee is required".into()));
        }

        let updated = self.repository.update(request_id, |request| {
            let at = request.next_timestamp(self.clock.now());
            request.record_assignee(assignee, at);
            Ok(())
        })?;

        log_event_with_fields(
            Event::RequestAssigned,
            &[
                ("request_id", updated.id.as_str()),
                ("assignee", assignee),
                ("actor_id", actor.id.as_str()),
            ],
        );

        Ok(updated)
    }

    /// Statuses reachable from `status` under the transition table
    pub fn legal_next_statuses(&self, status: RequestStatus) -> Vec<RequestStatus> {
        status.legal_next().to_vec()
    }

    /// Statuses `actor` may move a request in `status` to; empty for students
    pub fn available_transitions(&self, actor: &Principal, status: RequestStatus) -> Vec<RequestStatus> {
        if !can_change_status(actor) {
            return Vec::new();
        }
        status
            .legal_next()
            .iter()
            .copied()
            .filter(|target| self.policy.permits(actor, *target))
            .collect()
    }

    /// A single request, if `viewer` may see it
    pub fn get_request(&self, viewer: &Principal, request_id: &str) -> RequestResult<Request> {
        let request = self.repository.get_by_id(request_id)?;
        if !can_view_request(viewer, &request) {
            return Err(self.denied(viewer, "view", format!("request '{}' belongs to another student", request_id)));
        }
        Ok(request)
    }

    /// Requests `viewer` may see that match `criteria`, most recent first.
    /// Department heads are narrowed to their own department.
    pub fn list_requests(&self, viewer: &Principal, criteria: FilterCriteria) -> RequestResult<Vec<Request>> {
        let criteria = query::scoped_criteria(viewer, criteria);
        let mut visible = query::for_role(viewer, self.repository.filter(&criteria)?);
        query::sort_most_recent(&mut visible);
        Ok(visible)
    }

    pub fn recent_requests(&self, viewer: &Principal, limit: usize) -> RequestResult<Vec<Request>> {
        self.repository.recent(viewer, limit)
    }

    /// Status counts over what `viewer` can see, scoped like `list_requests`
    pub fn status_counts(&self, viewer: &Principal) -> RequestResult<StatusCounts> {
        let criteria = query::scoped_criteria(viewer, FilterCriteria::new());
        let visible = query::for_role(viewer, self.repository.filter(&criteria)?);
        Ok(StatusCounts::from_requests(&visible))
    }

    /// Request-management statistics; restricted to request managers
    pub fn statistics(&self, viewer: &Principal) -> RequestResult<RequestStatistics> {
        if !viewer.has_any_role(REQUEST_MANAGEMENT_ROLES) {
            return Err(self.denied(viewer, "statistics", format!(
                "role '{}' cannot view request statistics",
                viewer.role
            )));
        }
        let scoped = query::scoped_criteria(viewer, FilterCriteria::new());
        let requests = self.repository.filter(&scoped)?;
        Ok(RequestStatistics::from_requests(&requests))
    }

    /// Update a request the actor is allowed to view
    fn update_visible<F>(&self, request_id: &str, actor: &Principal, action: &str, mutate: F) -> RequestResult<Request>
    where
        F: FnOnce(&mut Request) -> RequestResult<()>,
    {
        let result = self.repository.update(request_id, |request| {
            if !can_view_request(actor, request) {
                return Err(RequestError::Forbidden(format!(
                    "request '{}' belongs to another student",
                    request.id
                )));
            }
            mutate(request)
        });

        match result {
            Err(RequestError::Forbidden(reason)) => Err(self.denied(actor, action, reason)),
            other => other,
        }
    }

    fn denied(&self, actor: &Principal, action: &str, reason: String) -> RequestError {
        log_event_with_fields(
            Event::AccessDenied,
            &[
                ("action", action),
                ("principal_id", actor.id.as_str()),
                ("role", actor.role.as_str()),
            ],
        );
        RequestError::Forbidden(reason)
    }

    fn notify(&self, draft: NotificationDraft) {
        let recipient = draft.recipient_id.clone();
        match self.notifier.emit(draft) {
            Ok(()) => log_event_with_fields(
                Event::NotificationEmitted,
                &[("recipient_id", recipient.as_str())],
            ),
            Err(e) => {
                let message = e.to_string();
                log_event_with_fields(
                    Event::NotificationFailed,
                    &[("recipient_id", recipient.as_str()), ("error", message.as_str())],
                );
            }
        }
    }
}

fn validate_attachment(draft: &AttachmentDraft) -> RequestResult<()> {
    if draft.file_name.trim().is_empty() {
        return Err(RequestError::Validation("attachment file name is required".into()));
    }
    if draft.media_type.trim().is_empty() {
        return Err(RequestError::Validation("attachment media type is required".into()));
    }
    Ok(())
}
