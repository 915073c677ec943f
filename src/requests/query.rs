//! # Request Queries
//!
//! Read-side views over a request collection: filtering, role narrowing,
//! ordering, counts, statistics and pagination. Everything here is pure
//! and works on owned snapshots handed out by the repository.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::lifecycle::RequestStatus;
use super::model::{Request, RequestType};
use crate::auth::guard::can_view_request;
use crate::auth::principal::{Principal, Role};

/// Filter over the request collection. Empty lists and `None` match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub statuses: Vec<RequestStatus>,
    #[serde(default)]
    pub types: Vec<RequestType>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub search_text: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(mut self, statuses: &[RequestStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn with_types(mut self, types: &[RequestType]) -> Self {
        self.types = types.to_vec();
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Whether `request` passes every criterion.
    ///
    /// The text search runs last and its result is returned directly.
    pub fn matches(&self, request: &Request) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&request.status) {
            return false;
        }

        if !self.types.is_empty() && !self.types.contains(&request.request_type) {
            return false;
        }

        if let Some(department) = &self.department {
            if &request.department != department {
                return false;
            }
        }

        match self.search_text.as_deref() {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                request.title.to_lowercase().contains(&needle)
                    || request.description.to_lowercase().contains(&needle)
                    || request.requester_name.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

pub fn filter(requests: Vec<Request>, criteria: &FilterCriteria) -> Vec<Request> {
    requests
        .into_iter()
        .filter(|request| criteria.matches(request))
        .collect()
}

/// Keep the requests `principal` may view
pub fn for_role(principal: &Principal, base: Vec<Request>) -> Vec<Request> {
    base.into_iter()
        .filter(|request| can_view_request(principal, request))
        .collect()
}

/// Department heads only see their own department
pub fn scoped_criteria(principal: &Principal, mut criteria: FilterCriteria) -> FilterCriteria {
    if principal.role == Role::DepartmentHead {
        if let Some(department) = &principal.department {
            criteria.department = Some(department.clone());
        }
    }
    criteria
}

/// Most recently updated first
pub fn sort_most_recent(requests: &mut [Request]) {
    requests.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// The `limit` most recently updated requests visible to `principal`
pub fn recent(principal: &Principal, requests: Vec<Request>, limit: usize) -> Vec<Request> {
    let mut visible = for_role(principal, requests);
    sort_most_recent(&mut visible);
    visible.truncate(limit);
    visible
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    /// `created` and `pending` together
    pub pending: usize,
    pub in_review: usize,
    pub more_info: usize,
    pub approved: usize,
    pub rejected: usize,
    pub archived: usize,
}

impl StatusCounts {
    pub fn from_requests(requests: &[Request]) -> Self {
        let mut counts = Self {
            total: requests.len(),
            ..Default::default()
        };

        for request in requests {
            match request.status {
                RequestStatus::Created | RequestStatus::Pending => counts.pending += 1,
                RequestStatus::InReview => counts.in_review += 1,
                RequestStatus::MoreInfo => counts.more_info += 1,
                RequestStatus::Approved => counts.approved += 1,
                RequestStatus::Rejected => counts.rejected += 1,
                RequestStatus::Archived => counts.archived += 1,
            }
        }

        counts
    }
}

/// Aggregates shown on the request-management dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatistics {
    pub total: usize,
    pub by_status: BTreeMap<RequestStatus, usize>,
    pub by_type: BTreeMap<RequestType, usize>,
    pub by_department: BTreeMap<String, usize>,
    /// Mean days from creation to last update over decided requests, rounded
    pub average_processing_days: u64,
    /// Approved share of all requests, as a rounded percentage
    pub approval_rate_percent: u64,
}

impl RequestStatistics {
    pub fn from_requests(requests: &[Request]) -> Self {
        let mut stats = Self {
            total: requests.len(),
            ..Default::default()
        };
        let mut processing_days = Vec::new();

        for request in requests {
            *stats.by_status.entry(request.status).or_insert(0) += 1;
            *stats.by_type.entry(request.request_type).or_insert(0) += 1;
            *stats
                .by_department
                .entry(request.department.clone())
                .or_insert(0) += 1;

            if request.status.is_decided() {
                let elapsed = request.updated_at - request.created_at;
                processing_days.push(elapsed.num_milliseconds() as f64 / 86_400_000.0);
            }
        }

        if !processing_days.is_empty() {
            let mean = processing_days.iter().sum::<f64>() / processing_days.len() as f64;
            stats.average_processing_days = mean.round().max(0.0) as u64;
        }

        if stats.total > 0 {
            let approved = stats
                .by_status
                .get(&RequestStatus::Approved)
                .copied()
                .unwrap_or(0);
            stats.approval_rate_percent =
                (approved as f64 / stats.total as f64 * 100.0).round() as u64;
        }

        stats
    }
}

/// One page of results, 1-based
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice `items` into pages of `per_page`; `page` is clamped into range.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total_pages,
        total_items,
    }
}
