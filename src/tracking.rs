//! Submitted request history and status timelines

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::request::RequestDraft;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key of the submitted request history
pub const HISTORY_KEY: &str = "idea2code_request_history";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl RequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Accepted => "Accepted",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub state: String,
    pub date: String,
    pub completed: bool,
}

impl TimelineEntry {
    fn new(state: &str, date: &str, completed: bool) -> Self {
        Self {
            state: state.to_string(),
            date: date.to_string(),
            completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRequest {
    pub id: String,
    pub title: String,
    pub date: String,
    pub status: RequestStatus,
    pub cost: String,
    pub duration: String,
    pub timeline: Vec<TimelineEntry>,
}

impl TrackedRequest {
    /// A freshly received request awaiting review
    pub fn from_submission(id: &str, draft: &RequestDraft, submitted_at: DateTime<Utc>) -> Self {
        let title = if draft.software_categories.is_empty() {
            "Custom Request".to_string()
        } else {
            draft
                .software_categories
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" + ")
        };

        Self {
            id: id.to_string(),
            title,
            date: submitted_at.format("%b %d, %Y").to_string(),
            status: RequestStatus::Pending,
            cost: "Pending".to_string(),
            duration: "TBD".to_string(),
            timeline: vec![
                TimelineEntry::new(
                    "Request Received",
                    &submitted_at.format("%b %d").to_string(),
                    true,
                ),
                TimelineEntry::new("Reviewing", "Today", false),
                TimelineEntry::new("Proposal Sent", "Pending", false),
            ],
        }
    }

    /// Number of completed timeline entries
    pub fn completed_steps(&self) -> usize {
        self.timeline.iter().filter(|e| e.completed).count()
    }
}

/// Requests shown to every user alongside their own submissions
pub fn demo_requests() -> Vec<TrackedRequest> {
    vec![
        TrackedRequest {
            id: "REQ-001".to_string(),
            title: "Mobile App Redesign".to_string(),
            date: "Feb 20, 2026".to_string(),
            status: RequestStatus::InProgress,
            cost: "$8,500".to_string(),
            duration: "4 Weeks".to_string(),
            timeline: vec![
                TimelineEntry::new("Request Received", "Feb 20", true),
                TimelineEntry::new("Proposal Accepted", "Feb 21", true),
                TimelineEntry::new("In Progress", "Feb 22", true),
                TimelineEntry::new("Quality Assurance", "Pending", false),
                TimelineEntry::new("Final Delivery", "Est. Mar 20", false),
            ],
        },
        TrackedRequest {
            id: "REQ-002".to_string(),
            title: "Corporate Website".to_string(),
            date: "Jan 15, 2026".to_string(),
            status: RequestStatus::Completed,
            cost: "$4,200".to_string(),
            duration: "2 Weeks".to_string(),
            timeline: vec![
                TimelineEntry::new("Request Received", "Jan 15", true),
                TimelineEntry::new("Proposal Accepted", "Jan 16", true),
                TimelineEntry::new("In Progress", "Jan 18", true),
                TimelineEntry::new("Quality Assurance", "Jan 28", true),
                TimelineEntry::new("Final Delivery", "Jan 30", true),
            ],
        },
        TrackedRequest {
            id: "REQ-003".to_string(),
            title: "CRM Integration".to_string(),
            date: "Feb 22, 2026".to_string(),
            status: RequestStatus::Pending,
            cost: "Pending".to_string(),
            duration: "TBD".to_string(),
            timeline: vec![
                TimelineEntry::new("Request Received", "Feb 22", true),
                TimelineEntry::new("Reviewing", "Today", false),
                TimelineEntry::new("Proposal Sent", "Pending", false),
            ],
        },
    ]
}

/// Requests accepted by the simulated back end, newest first
#[derive(Clone)]
pub struct RequestHistory {
    store: Arc<dyn KeyValueStore>,
}

impl RequestHistory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<TrackedRequest> {
        let Some(raw) = self.store.get(HISTORY_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "Request history is malformed, ignoring it");
            Vec::new()
        })
    }

    pub fn record(&self, request: TrackedRequest) -> Result<(), StorageError> {
        let mut requests = self.list();
        requests.insert(0, request);
        let encoded = serde_json::to_string(&requests)?;
        self.store.set(HISTORY_KEY, &encoded)
    }

    /// The user's own requests followed by the demonstration requests
    pub fn all_with_samples(&self) -> Vec<TrackedRequest> {
        let mut requests = self.list();
        requests.extend(demo_requests());
        requests
    }
}
