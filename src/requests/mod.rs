//! # acadreq Requests Module
//!
//! The request model, its status state machine, the repository that owns
//! the collection, the read-side query views, and the lifecycle engine
//! through which every mutation flows.

pub mod engine;
pub mod errors;
pub mod lifecycle;
pub mod model;
pub mod query;
pub mod repository;
mod seed;

pub use engine::{Clock, LifecycleEngine, SystemClock};
pub use errors::{RequestError, RequestResult};
pub use lifecycle::{validate_transition, RequestStatus, TransitionPolicy};
pub use model::{
    Attachment, AttachmentDraft, Comment, Request, RequestDraft, RequestType, StatusEvent, Urgency,
};
pub use query::{paginate, FilterCriteria, Page, RequestStatistics, StatusCounts};
pub use repository::RequestRepository;
