//! Example dataset written on first start

use chrono::{DateTime, TimeZone, Utc};

use super::lifecycle::RequestStatus;
use super::model::{Attachment, Comment, Request, RequestType, StatusEvent, Urgency};
use crate::auth::principal::Role;

const STUDENT_ID: &str = "5";
const STUDENT_NAME: &str = "Student User";
const DEPARTMENT: &str = "Computer Science";

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("seed dates are valid calendar dates")
}

fn event(status: RequestStatus, actor: &str, at: DateTime<Utc>, comment: Option<&str>) -> StatusEvent {
    StatusEvent {
        status,
        actor_name: actor.to_string(),
        changed_at: at,
        comment: comment.map(str::to_string),
    }
}

fn pdf(id: &str, file_name: &str, size_bytes: u64, uploaded_at: DateTime<Utc>) -> Attachment {
    Attachment {
        id: id.to_string(),
        file_name: file_name.to_string(),
        media_type: "application/pdf".to_string(),
        size_bytes,
        uploaded_at,
        content_ref: format!("seed/{}", id),
    }
}

/// The three requests of the example dataset, all owned by the demo student
pub fn seed_requests() -> Vec<Request> {
    vec![
        Request {
            id: "1".to_string(),
            title: "Demande de relevé de notes".to_string(),
            description: "Je souhaite obtenir mon relevé de notes pour la session 2023."
                .to_string(),
            request_type: RequestType::Transcript,
            status: RequestStatus::Created,
            urgency: Urgency::Medium,
            requester_id: STUDENT_ID.to_string(),
            requester_name: STUDENT_NAME.to_string(),
            department: DEPARTMENT.to_string(),
            created_at: day(2023, 6, 15),
            updated_at: day(2023, 6, 15),
            assignee: None,
            comments: Vec::new(),
            attachments: Vec::new(),
            status_history: vec![event(RequestStatus::Created, STUDENT_NAME, day(2023, 6, 15), None)],
        },
        Request {
            id: "2".to_string(),
            title: "Réclamation de note examen Algorithme".to_string(),
            description: "Je souhaite faire une réclamation concernant ma note d'examen en \
                          Algorithme qui me semble incorrecte."
                .to_string(),
            request_type: RequestType::GradeAppeal,
            status: RequestStatus::InReview,
            urgency: Urgency::High,
            requester_id: STUDENT_ID.to_string(),
            requester_name: STUDENT_NAME.to_string(),
            department: DEPARTMENT.to_string(),
            created_at: day(2023, 5, 10),
            updated_at: day(2023, 5, 25),
            assignee: Some("Teacher User".to_string()),
            comments: vec![Comment {
                id: "c1".to_string(),
                author_id: "2".to_string(),
                author_name: "Teacher User".to_string(),
                author_role: Role::Teacher,
                text: "Votre demande est en cours d'examen. Merci de fournir votre copie."
                    .to_string(),
                created_at: day(2023, 5, 20),
            }],
            attachments: vec![pdf("a1", "Screenshot_note.pdf", 2_500_000, day(2023, 5, 10))],
            status_history: vec![
                event(RequestStatus::Created, STUDENT_NAME, day(2023, 5, 10), None),
                event(
                    RequestStatus::InReview,
                    "Academic Secretary",
                    day(2023, 5, 15),
                    Some("Requête transmise au professeur concerné"),
                ),
            ],
        },
        Request {
            id: "3".to_string(),
            title: "Demande de dispense de cours".to_string(),
            description: "Je demande une dispense pour le cours de Statistiques car j'ai déjà \
                          validé ce module dans mon établissement précédent."
                .to_string(),
            request_type: RequestType::Exemption,
            status: RequestStatus::Approved,
            urgency: Urgency::Medium,
            requester_id: STUDENT_ID.to_string(),
            requester_name: STUDENT_NAME.to_string(),
            department: DEPARTMENT.to_string(),
            created_at: day(2023, 4, 5),
            updated_at: day(2023, 4, 20),
            assignee: Some("Department Head".to_string()),
            comments: vec![Comment {
                id: "c2".to_string(),
                author_id: "3".to_string(),
                author_name: "Department Head".to_string(),
                author_role: Role::DepartmentHead,
                text: "Après examen de votre dossier, votre demande est approuvée.".to_string(),
                created_at: day(2023, 4, 20),
            }],
            attachments: vec![
                pdf("a2", "Relevé_notes_précédent.pdf", 3_500_000, day(2023, 4, 5)),
                pdf("a3", "Programme_cours.pdf", 1_500_000, day(2023, 4, 5)),
            ],
            status_history: vec![
                event(RequestStatus::Created, STUDENT_NAME, day(2023, 4, 5), None),
                event(RequestStatus::InReview, "Academic Secretary", day(2023, 4, 10), None),
                event(
                    RequestStatus::Approved,
                    "Department Head",
                    day(2023, 4, 20),
                    Some("Dispense accordée après vérification des acquis"),
                ),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_requests_hold_invariants() {
        let requests = seed_requests();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            assert!(request.check_invariants().is_ok(), "{}", request.id);
            assert_eq!(request.requester_id, STUDENT_ID);
        }
    }
}
