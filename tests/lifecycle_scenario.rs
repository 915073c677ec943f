//! Lifecycle Scenario Tests
//!
//! Drives one request through its whole life against a file-backed slot:
//! - created by a student
//! - reviewed, approved and archived by staff
//! - reopened from the archive
//!
//! After every step the request's status equals its last history entry.

use std::sync::Arc;

use acadreq::auth::{Credentials, DemoDirectory, IdentityProvider, Principal, Role};
use acadreq::notifications::{NotificationCenter, NotificationKind};
use acadreq::requests::{
    LifecycleEngine, Request, RequestDraft, RequestError, RequestRepository, RequestStatus,
    RequestType,
};
use acadreq::slot::{DurableSlot, FileSlot};
use tempfile::TempDir;

fn principal(email: &str) -> Principal {
    DemoDirectory::new()
        .authenticate(&Credentials::new(email, ""))
        .unwrap()
}

fn open(dir: &TempDir) -> (LifecycleEngine, Arc<NotificationCenter>) {
    let slot: Arc<dyn DurableSlot> = Arc::new(FileSlot::new(dir.path()));
    let center = Arc::new(NotificationCenter::open(slot.clone(), false).unwrap());
    let repository = RequestRepository::open(slot, false).unwrap();
    (LifecycleEngine::new(repository, center.clone()), center)
}

fn assert_consistent(request: &Request) {
    let last = request.status_history.last().unwrap();
    assert_eq!(request.status, last.status);
    assert!(request.check_invariants().is_ok());
}

// =============================================================================
// Full lifecycle
// =============================================================================

#[test]
fn test_full_request_lifecycle() {
    let dir = TempDir::new().unwrap();
    let (engine, center) = open(&dir);

    let student = principal("student@univ.test");
    let secretary = principal("secretary@univ.test");
    let head = principal("head@univ.test");
    assert_eq!(secretary.role, Role::AcademicSecretary);
    assert_eq!(head.role, Role::DepartmentHead);

    let draft = RequestDraft::new(
        "Demande de relevé",
        "Relevé de notes pour la session 2023",
        RequestType::Transcript,
    );
    let request = engine.submit_request(draft, &student).unwrap();
    assert_eq!(request.status, RequestStatus::Created);
    assert_eq!(request.status_history.len(), 1);
    assert!(center.for_recipient(&student.id).unwrap().is_empty());

    let request = engine
        .request_status_change(&request.id, RequestStatus::InReview, &secretary, Some("transmise"))
        .unwrap();
    assert_eq!(request.status_history.len(), 2);
    assert_consistent(&request);

    let inbox = center.for_recipient(&student.id).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].link.as_deref(), Some(format!("/requests/{}", request.id).as_str()));

    let request = engine
        .request_status_change(&request.id, RequestStatus::Approved, &head, None)
        .unwrap();
    assert_eq!(request.status_history.len(), 3);
    assert_eq!(request.status_history[2].actor_name, head.display_name);
    assert_consistent(&request);
    assert_eq!(
        center.for_recipient(&student.id).unwrap()[0].kind,
        NotificationKind::Success
    );

    let request = engine
        .request_status_change(&request.id, RequestStatus::Archived, &secretary, None)
        .unwrap();
    assert_eq!(request.status_history.len(), 4);
    assert_consistent(&request);

    let result = engine.request_status_change(&request.id, RequestStatus::InReview, &secretary, None);
    assert!(matches!(
        result,
        Err(RequestError::IllegalTransition {
            from: RequestStatus::Archived,
            to: RequestStatus::InReview
        })
    ));
    assert_eq!(
        engine.repository().get_by_id(&request.id).unwrap().status_history.len(),
        4
    );

    let request = engine
        .request_status_change(&request.id, RequestStatus::Pending, &secretary, None)
        .unwrap();
    assert_eq!(request.status_history.len(), 5);
    assert_consistent(&request);
    assert_eq!(center.for_recipient(&student.id).unwrap().len(), 4);
}

#[test]
fn test_approved_cannot_return_to_pending() {
    let dir = TempDir::new().unwrap();
    let (engine, _) = open(&dir);
    let student = principal("student@univ.test");
    let admin = principal("admin@univ.test");

    let request = engine
        .submit_request(RequestDraft::new("t", "d", RequestType::Other), &student)
        .unwrap();
    engine
        .request_status_change(&request.id, RequestStatus::Approved, &admin, None)
        .unwrap();

    assert!(matches!(
        engine.request_status_change(&request.id, RequestStatus::Pending, &admin, None),
        Err(RequestError::IllegalTransition { .. })
    ));
}

#[test]
fn test_students_never_change_status() {
    let dir = TempDir::new().unwrap();
    let (engine, _) = open(&dir);
    let student = principal("student@univ.test");

    let request = engine
        .submit_request(RequestDraft::new("t", "d", RequestType::Other), &student)
        .unwrap();

    for target in RequestStatus::ALL {
        assert!(matches!(
            engine.request_status_change(&request.id, target, &student, None),
            Err(RequestError::Forbidden(_))
        ));
    }
    assert_eq!(
        engine.repository().get_by_id(&request.id).unwrap().status_history.len(),
        1
    );
}

// =============================================================================
// Durability across restarts
// =============================================================================

#[test]
fn test_reopened_engine_sees_same_collection() {
    let dir = TempDir::new().unwrap();
    let student = principal("student@univ.test");
    let teacher = principal("teacher@univ.test");

    let before = {
        let (engine, _) = open(&dir);
        let request = engine
            .submit_request(RequestDraft::new("t", "d", RequestType::Enrollment), &student)
            .unwrap();
        engine.add_comment(&request.id, &teacher, "Merci").unwrap();
        engine.repository().all().unwrap()
    };

    let (engine, center) = open(&dir);
    assert_eq!(engine.repository().all().unwrap(), before);
    assert_eq!(center.unread_count(&student.id).unwrap(), 1);
}
