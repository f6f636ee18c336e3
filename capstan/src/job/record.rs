//! Job records, ids, tickets and failure payloads.

use super::state::JobState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique job IDs.
static JOB_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a job.
///
/// Ids are unique for the lifetime of the process and never reused.
#[derive(Clone, Hash, Eq, PartialEq, Serialize)]
pub struct JobId(String);

impl JobId {
    /// Creates a job ID from an existing string value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocates the next unique job ID.
    ///
    /// The format is `job-{counter}` where counter is monotonically
    /// increasing, which keeps allocation collision-free under concurrent
    /// creation without coordination.
    pub fn next() -> Self {
        let counter = JOB_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("job-{}", counter))
    }

    /// Returns the string value of this job ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Structured error payload recorded on a failed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobFailure {
    /// Human-readable failure description.
    pub message: String,
}

impl JobFailure {
    /// Creates a failure payload with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A tracked asynchronous execution and its lifecycle bookkeeping.
///
/// Records are owned by the job table; callers always receive clones, so
/// a held record is a snapshot, not a live view. Re-read through
/// `JobTable::find` for current state.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    /// Unique job id.
    pub id: JobId,

    /// Current lifecycle state.
    pub state: JobState,

    /// Human-readable description of the work, e.g. `"rabbitmq: restart"`.
    pub description: String,

    /// Creation timestamp (UTC).
    pub created_at: DateTime<Utc>,

    /// Result payload; present only in the Success state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Failure payload; present only in the Failure state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
}

impl JobRecord {
    /// Creates a fresh record in the Queued state.
    pub(crate) fn new(description: impl Into<String>) -> Self {
        Self {
            id: JobId::next(),
            state: JobState::Queued,
            description: description.into(),
            created_at: Utc::now(),
            result: None,
            error: None,
        }
    }
}

/// Immutable handle returned to the caller of an invocation.
///
/// The ticket carries no state of its own — poll the job table with the
/// referenced id for current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobTicket {
    /// Id of the job this ticket references.
    pub job_id: JobId,
}

impl JobTicket {
    /// Creates a ticket for the given job.
    pub fn new(job_id: JobId) -> Self {
        Self { job_id }
    }
}
