//! Repository Persistence and Query Tests
//!
//! - persist + reload yields a structurally identical collection
//! - a failed write leaves the in-memory collection untouched
//! - a corrupted slot is a persistence failure, never silently reseeded
//! - filtering and role narrowing over the seeded dataset

use std::fs;
use std::sync::Arc;

use acadreq::auth::{Principal, Role};
use acadreq::notifications::DiscardSink;
use acadreq::requests::query::{for_role, scoped_criteria};
use acadreq::requests::{
    FilterCriteria, LifecycleEngine, RequestDraft, RequestError, RequestRepository,
    RequestStatus, RequestType,
};
use acadreq::slot::{DurableSlot, FileSlot, MemorySlot, REQUESTS_KEY};
use tempfile::TempDir;

fn student(id: &str) -> Principal {
    Principal::new(id, format!("Student {}", id), format!("s{}@univ.test", id), Role::Student)
        .with_department("Computer Science")
}

fn staff(role: Role) -> Principal {
    Principal::new("9", "Staff Member", "staff@univ.test", role).with_department("Mathematics")
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_seeded_collection_round_trips_through_file_slot() {
    let dir = TempDir::new().unwrap();
    let slot: Arc<dyn DurableSlot> = Arc::new(FileSlot::new(dir.path()));

    let first = RequestRepository::open(slot.clone(), true).unwrap();
    let reloaded = RequestRepository::open(slot, true).unwrap();

    assert_eq!(first.all().unwrap(), reloaded.all().unwrap());
    assert_eq!(reloaded.len().unwrap(), 3);
}

#[test]
fn test_seeded_legacy_review_status_is_in_review() {
    let repo = RequestRepository::open(Arc::new(MemorySlot::new()), true).unwrap();
    let request = repo.get_by_id("2").unwrap();

    assert_eq!(request.status, RequestStatus::InReview);
    assert_eq!(request.assignee.as_deref(), Some("Teacher User"));
    assert_eq!(
        request.status_history[1].comment.as_deref(),
        Some("Requête transmise au professeur concerné")
    );
}

// =============================================================================
// Failure atomicity
// =============================================================================

#[test]
fn test_persistence_failure_during_status_change() {
    let slot = Arc::new(MemorySlot::new());
    let repository = RequestRepository::open(slot.clone(), true).unwrap();
    let engine = LifecycleEngine::new(repository, Arc::new(DiscardSink));
    let before = engine.repository().all().unwrap();

    slot.set_fail_writes(true);
    let result = engine.request_status_change("1", RequestStatus::InReview, &staff(Role::Admin), None);

    assert!(matches!(result, Err(RequestError::Persistence(_))));
    assert_eq!(engine.repository().all().unwrap(), before);

    slot.set_fail_writes(false);
    engine
        .request_status_change("1", RequestStatus::InReview, &staff(Role::Admin), None)
        .unwrap();
    assert_eq!(engine.repository().get_by_id("1").unwrap().status_history.len(), 2);
}

#[test]
fn test_persistence_failure_during_submit() {
    let slot = Arc::new(MemorySlot::new());
    let repository = RequestRepository::open(slot.clone(), false).unwrap();
    let engine = LifecycleEngine::new(repository, Arc::new(DiscardSink));

    slot.set_fail_writes(true);
    let result = engine.submit_request(RequestDraft::new("t", "d", RequestType::Other), &student("5"));

    assert!(matches!(result, Err(RequestError::Persistence(_))));
    assert!(engine.repository().is_empty().unwrap());
}

#[test]
fn test_tampered_file_is_persistence_failure() {
    let dir = TempDir::new().unwrap();
    let slot: Arc<dyn DurableSlot> = Arc::new(FileSlot::new(dir.path()));
    RequestRepository::open(slot.clone(), true).unwrap();

    let path = dir.path().join(format!("{}.json", REQUESTS_KEY));
    let content = fs::read_to_string(&path).unwrap();
    fs::write(&path, content.replace("Demande", "Requête")).unwrap();

    assert!(matches!(
        RequestRepository::open(slot, true),
        Err(RequestError::Persistence(_))
    ));
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_type_filter_over_mixed_collection() {
    let repository = RequestRepository::open(Arc::new(MemorySlot::new()), false).unwrap();
    let engine = LifecycleEngine::new(repository, Arc::new(DiscardSink));
    let owner = student("5");

    for (title, kind) in [
        ("Relevé S1", RequestType::Transcript),
        ("Réclamation", RequestType::GradeAppeal),
        ("Relevé S2", RequestType::Transcript),
    ] {
        engine
            .submit_request(RequestDraft::new(title, "Session 2023", kind), &owner)
            .unwrap();
    }

    let transcripts = engine
        .repository()
        .filter(&FilterCriteria::new().with_types(&[RequestType::Transcript]))
        .unwrap();
    assert_eq!(transcripts.len(), 2);
    assert!(transcripts.iter().all(|r| r.request_type == RequestType::Transcript));

    let by_text = engine
        .repository()
        .filter(&FilterCriteria::new().with_search_text("relevé"))
        .unwrap();
    assert_eq!(by_text.len(), 2);
}

#[test]
fn test_visibility_over_seeded_dataset() {
    let repo = RequestRepository::open(Arc::new(MemorySlot::new()), true).unwrap();

    assert_eq!(for_role(&student("5"), repo.all().unwrap()).len(), 3);
    assert!(for_role(&student("6"), repo.all().unwrap()).is_empty());
    assert_eq!(for_role(&staff(Role::Teacher), repo.all().unwrap()).len(), 3);
}

#[test]
fn test_department_head_scoping() {
    let repo = RequestRepository::open(Arc::new(MemorySlot::new()), true).unwrap();
    let engine = LifecycleEngine::new(repo, Arc::new(DiscardSink));

    let math_head = staff(Role::DepartmentHead);
    let criteria = scoped_criteria(&math_head, FilterCriteria::new());
    assert_eq!(criteria.department.as_deref(), Some("Mathematics"));
    assert!(engine.list_requests(&math_head, FilterCriteria::new()).unwrap().is_empty());

    let secretary = staff(Role::AcademicSecretary);
    let listed = engine.list_requests(&secretary, FilterCriteria::new()).unwrap();
    let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}
