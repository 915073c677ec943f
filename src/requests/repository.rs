//! # Request Repository
//!
//! Exclusive owner of the request collection. The whole collection lives in
//! one durable slot and is rewritten on every mutation.
//!
//! ## Invariants
//! - Every mutation is computed on a copy, persisted, then committed; a
//!   persistence failure leaves the in-memory collection untouched
//! - Request ids are unique
//! - An absent slot is seeded at most once, on open

use std::sync::{Arc, RwLock};

use super::errors::{RequestError, RequestResult};
use super::model::Request;
use super::query::{self, FilterCriteria};
use super::seed::seed_requests;
use crate::auth::principal::Principal;
use crate::observability::{log_event_with_fields, Event};
use crate::slot::{load_json, save_json, DurableSlot, SlotError, REQUESTS_KEY};

fn lock_poisoned() -> RequestError {
    RequestError::Persistence("Lock poisoned".into())
}

/// Read access to the request collection.
///
/// Writes are crate-private; callers mutate requests through
/// [`LifecycleEngine`](super::LifecycleEngine) only.
///
/// ```compile_fail
/// use std::sync::Arc;
/// use acadreq::requests::RequestRepository;
/// use acadreq::slot::MemorySlot;
///
/// let repository = RequestRepository::open(Arc::new(MemorySlot::new()), true).unwrap();
/// repository
///     .update("1", |request| {
///         request.title = "rewritten".into();
///         Ok(())
///     })
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct RequestRepository {
    slot: Arc<dyn DurableSlot>,
    requests: RwLock<Vec<Request>>,
}

impl RequestRepository {
    /// Load the collection from `slot`. When the slot was never written and
    /// `seed` is set, the example dataset is written immediately.
    pub fn open(slot: Arc<dyn DurableSlot>, seed: bool) -> RequestResult<Self> {
        let loaded: Option<Vec<Request>> = match load_json(slot.as_ref(), REQUESTS_KEY) {
            Ok(loaded) => loaded,
            Err(e) => {
                let event = if e.is_data_error() {
                    Event::SlotCorruption
                } else {
                    Event::PersistenceFailed
                };
                let message = e.to_string();
                log_event_with_fields(event, &[("key", REQUESTS_KEY), ("error", message.as_str())]);
                return Err(e.into());
            }
        };

        let requests = match loaded {
            Some(requests) => {
                for request in &requests {
                    request.check_invariants().map_err(|reason| {
                        log_event_with_fields(
                            Event::SlotCorruption,
                            &[("key", REQUESTS_KEY), ("error", reason.as_str())],
                        );
                        RequestError::from(SlotError::Corrupted(reason))
                    })?;
                }
                let count = requests.len().to_string();
                log_event_with_fields(Event::RepositoryLoaded, &[("count", count.as_str())]);
                requests
            }
            None if seed => {
                let requests = seed_requests();
                persist(slot.as_ref(), &requests)?;
                let count = requests.len().to_string();
                log_event_with_fields(Event::RepositorySeeded, &[("count", count.as_str())]);
                requests
            }
            None => Vec::new(),
        };

        Ok(Self {
            slot,
            requests: RwLock::new(requests),
        })
    }

    pub fn get_by_id(&self, id: &str) -> RequestResult<Request> {
        self.find(id)?
            .ok_or_else(|| RequestError::request_not_found(id))
    }

    pub fn find(&self, id: &str) -> RequestResult<Option<Request>> {
        let requests = self.requests.read().map_err(|_| lock_poisoned())?;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    /// Snapshot of the whole collection
    pub fn all(&self) -> RequestResult<Vec<Request>> {
        let requests = self.requests.read().map_err(|_| lock_poisoned())?;
        Ok(requests.clone())
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> RequestResult<Vec<Request>> {
        let requests = self.requests.read().map_err(|_| lock_poisoned())?;
        Ok(requests
            .iter()
            .filter(|request| criteria.matches(request))
            .cloned()
            .collect())
    }

    pub fn len(&self) -> RequestResult<usize> {
        let requests = self.requests.read().map_err(|_| lock_poisoned())?;
        Ok(requests.len())
    }

    pub fn is_empty(&self) -> RequestResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Add a new request; the id must not already exist
    pub(crate) fn insert(&self, request: Request) -> RequestResult<()> {
        let mut requests = self.requests.write().map_err(|_| lock_poisoned())?;

        if requests.iter().any(|r| r.id == request.id) {
            return Err(RequestError::Validation(format!(
                "request '{}' already exists",
                request.id
            )));
        }

        let mut next = requests.clone();
        next.push(request);
        self.commit(&mut requests, next)
    }

    /// Apply `mutate` to a copy of request `id`, persist, then commit.
    ///
    /// Returns the updated request. If `mutate` fails nothing is written.
    pub(crate) fn update<F>(&self, id: &str, mutate: F) -> RequestResult<Request>
    where
        F: FnOnce(&mut Request) -> RequestResult<()>,
    {
        let mut requests = self.requests.write().map_err(|_| lock_poisoned())?;

        let index = requests
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| RequestError::request_not_found(id))?;

        let mut updated = requests[index].clone();
        mutate(&mut updated)?;
        updated
            .check_invariants()
            .map_err(RequestError::Validation)?;

        let mut next = requests.clone();
        next[index] = updated.clone();
        self.commit(&mut requests, next)?;

        Ok(updated)
    }

    fn commit(&self, current: &mut Vec<Request>, next: Vec<Request>) -> RequestResult<()> {
        persist(self.slot.as_ref(), &next)?;
        *current = next;
        Ok(())
    }

    /// Visible requests for `principal`, most recently updated first.
    /// Department heads only see their own department.
    pub fn recent(&self, principal: &Principal, limit: usize) -> RequestResult<Vec<Request>> {
        let criteria = query::scoped_criteria(principal, FilterCriteria::new());
        Ok(query::recent(principal, self.filter(&criteria)?, limit))
    }
}

fn persist(slot: &dyn DurableSlot, requests: &[Request]) -> RequestResult<()> {
    save_json(slot, REQUESTS_KEY, requests).map_err(|e| {
        let message = e.to_string();
        log_event_with_fields(
            Event::PersistenceFailed,
            &[("key", REQUESTS_KEY), ("error", message.as_str())],
        );
        RequestError::from(e)
    })
}
