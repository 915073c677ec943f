//! Notification wording for request events.
//!
//! Messages are in French, matching the institution's UI.

use super::{NotificationDraft, NotificationKind};
use crate::requests::lifecycle::RequestStatus;
use crate::requests::model::Request;

/// Navigation link to a request's detail page
pub fn request_link(request_id: &str) -> String {
    format!("/requests/{}", request_id)
}

fn status_verb(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Created => "créée",
        RequestStatus::Pending => "mise en attente",
        RequestStatus::InReview => "placée en cours d'examen",
        RequestStatus::MoreInfo => "marquée comme nécessitant plus d'informations",
        RequestStatus::Approved => "approuvée",
        RequestStatus::Rejected => "rejetée",
        RequestStatus::Archived => "archivée",
    }
}

fn status_kind(status: RequestStatus) -> NotificationKind {
    match status {
        RequestStatus::Approved => NotificationKind::Success,
        RequestStatus::Rejected => NotificationKind::Error,
        RequestStatus::MoreInfo => NotificationKind::Warning,
        _ => NotificationKind::Info,
    }
}

/// Sent to the requester after a status change
pub fn status_changed(request: &Request, actor_name: &str) -> NotificationDraft {
    NotificationDraft {
        recipient_id: request.requester_id.clone(),
        title: "Statut mis à jour".to_string(),
        message: format!(
            "Votre requête \"{}\" a été {} par {}",
            request.title,
            status_verb(request.status),
            actor_name
        ),
        kind: status_kind(request.status),
        link: Some(request_link(&request.id)),
    }
}

/// Sent to the requester when staff comments
pub fn comment_added(request: &Request, author_name: &str) -> NotificationDraft {
    NotificationDraft {
        recipient_id: request.requester_id.clone(),
        title: "Nouveau commentaire".to_string(),
        message: format!(
            "{} a ajouté un commentaire à votre requête \"{}\"",
            author_name, request.title
        ),
        kind: NotificationKind::Info,
        link: Some(request_link(&request.id)),
    }
}

/// Sent to the requester when staff attaches a document
pub fn attachment_added(request: &Request, uploader_name: &str, file_name: &str) -> NotificationDraft {
    NotificationDraft {
        recipient_id: request.requester_id.clone(),
        title: "Nouvelle pièce jointe".to_string(),
        message: format!(
            "{} a ajouté le document \"{}\" à votre requête \"{}\"",
            uploader_name, file_name, request.title
        ),
        kind: NotificationKind::Info,
        link: Some(request_link(&request.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::principal::{Principal, Role};
    use crate::requests::model::{RequestDraft, RequestType};
    use chrono::Utc;

    fn request() -> Request {
        let student = Principal::new("5", "Student User", "student@univ.test", Role::Student);
        Request::submitted(
            "42",
            RequestDraft::new("Demande de relevé", "Session 2023", RequestType::Transcript),
            &student,
            Utc::now(),
        )
    }

    #[test]
    fn test_status_changed_wording() {
        let mut r = request();
        r.status = RequestStatus::Approved;

        let draft = status_changed(&r, "Department Head");

        assert_eq!(draft.recipient_id, "5");
        assert_eq!(draft.title, "Statut mis à jour");
        assert_eq!(
            draft.message,
            "Votre requête \"Demande de relevé\" a été approuvée par Department Head"
        );
        assert_eq!(draft.kind, NotificationKind::Success);
        assert_eq!(draft.link.as_deref(), Some("/requests/42"));
    }

    #[test]
    fn test_status_kinds() {
        assert_eq!(status_kind(RequestStatus::Rejected), NotificationKind::Error);
        assert_eq!(status_kind(RequestStatus::MoreInfo), NotificationKind::Warning);
        assert_eq!(status_kind(RequestStatus::InReview), NotificationKind::Info);
        assert_eq!(status_kind(RequestStatus::Archived), NotificationKind::Info);
    }

    #[test]
    fn test_comment_and_attachment_wording() {
        let r = request();

        let comment = comment_added(&r, "Teacher User");
        assert_eq!(comment.title, "Nouveau commentaire");
        assert!(comment.message.starts_with("Teacher User a ajouté un commentaire"));

        let attachment = attachment_added(&r, "Academic Secretary", "releve.pdf");
        assert_eq!(attachment.kind, NotificationKind::Info);
        assert!(attachment.message.contains("\"releve.pdf\""));
    }
}
