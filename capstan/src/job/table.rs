//! The job table - authoritative store of job records.
//!
//! The table is the single source of truth for job state and the only
//! place a job's state field is mutated. State-changing methods are
//! `pub(crate)` so that the supervisor is the only possible writer;
//! everything else reads snapshots.

use super::record::{JobFailure, JobId, JobRecord};
use super::state::JobState;
use crate::error::CoreError;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// A rejected state transition.
///
/// Carries the state the job was actually in, or `None` when the id is
/// unknown. Rejections after a terminal write are expected races and are
/// handled by callers as no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransitionRejected {
    pub current: Option<JobState>,
}

struct TableEntry {
    /// Insertion sequence, used to keep snapshots in creation order.
    seq: u64,
    record: JobRecord,
    status_tx: watch::Sender<JobState>,
}

/// Authoritative store of job records and their lifecycle state.
///
/// Entries live for the lifetime of the process; terminal jobs stay
/// visible through `list()` and are never evicted. All queries return
/// clones, so concurrent transitions never corrupt a snapshot a caller
/// is iterating.
#[derive(Default)]
pub struct JobTable {
    jobs: DashMap<JobId, TableEntry>,
    sequence: AtomicU64,
}

impl JobTable {
    /// Creates an empty job table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh record in the Queued state and returns a snapshot of it.
    pub(crate) fn create(&self, description: impl Into<String>) -> JobRecord {
        let record = JobRecord::new(description);
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let (status_tx, _status_rx) = watch::channel(JobState::Queued);

        let snapshot = record.clone();
        self.jobs.insert(
            record.id.clone(),
            TableEntry {
                seq,
                record,
                status_tx,
            },
        );
        snapshot
    }

    /// Returns a snapshot of the job with the given id.
    pub fn find(&self, id: &JobId) -> Result<JobRecord, CoreError> {
        self.jobs
            .get(id)
            .map(|entry| entry.record.clone())
            .ok_or_else(|| CoreError::JobNotFound {
                job_id: id.to_string(),
            })
    }

    /// Returns snapshots of every job, in creation order.
    pub fn list(&self) -> Vec<JobRecord> {
        let mut entries: Vec<(u64, JobRecord)> = self
            .jobs
            .iter()
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, record)| record).collect()
    }

    /// Returns snapshots of jobs whose state is Queued or Running, in creation order.
    pub fn active(&self) -> Vec<JobRecord> {
        let mut entries: Vec<(u64, JobRecord)> = self
            .jobs
            .iter()
            .filter(|entry| entry.record.state.is_active())
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, record)| record).collect()
    }

    /// Subscribes to state transitions for the given job.
    ///
    /// The receiver observes states in lifecycle order and never sees a
    /// transition out of a terminal state. Polling `find` remains the
    /// primary observation path; this is a convenience for callers that
    /// want push-style notification.
    pub fn watch(&self, id: &JobId) -> Result<watch::Receiver<JobState>, CoreError> {
        self.jobs
            .get(id)
            .map(|entry| entry.status_tx.subscribe())
            .ok_or_else(|| CoreError::JobNotFound {
                job_id: id.to_string(),
            })
    }

    /// Number of jobs in the table (all states).
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Returns true when no jobs have been created yet.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Queued → Running.
    pub(crate) fn mark_running(&self, id: &JobId) -> Result<(), TransitionRejected> {
        self.transition(id, JobState::Running, |_| {})
    }

    /// Running → Success, recording the result payload.
    pub(crate) fn complete(
        &self,
        id: &JobId,
        result: serde_json::Value,
    ) -> Result<(), TransitionRejected> {
        self.transition(id, JobState::Success, |record| {
            record.result = Some(result);
        })
    }

    /// Running → Failure, recording the structured error.
    pub(crate) fn fail(&self, id: &JobId, failure: JobFailure) -> Result<(), TransitionRejected> {
        self.transition(id, JobState::Failure, |record| {
            record.error = Some(failure);
        })
    }

    /// Queued|Running → Cancelled.
    pub(crate) fn cancel(&self, id: &JobId) -> Result<(), TransitionRejected> {
        self.transition(id, JobState::Cancelled, |_| {})
    }

    /// Applies a state transition under the entry lock.
    ///
    /// The compare-and-set against the current state enforces the
    /// one-directional lifecycle and the first-terminal-write-wins rule:
    /// once a terminal state is recorded, every later transition attempt
    /// is rejected.
    fn transition(
        &self,
        id: &JobId,
        next: JobState,
        apply: impl FnOnce(&mut JobRecord),
    ) -> Result<(), TransitionRejected> {
        let mut entry = self
            .jobs
            .get_mut(id)
            .ok_or(TransitionRejected { current: None })?;

        let current = entry.record.state;
        if !transition_allowed(current, next) {
            return Err(TransitionRejected {
                current: Some(current),
            });
        }

        entry.record.state = next;
        apply(&mut entry.record);
        entry.status_tx.send_replace(next);
        Ok(())
    }
}

/// The lifecycle state machine.
fn transition_allowed(from: JobState, to: JobState) -> bool {
    use JobState::*;
    matches!(
        (from, to),
        (Queued, Running) | (Queued, Cancelled) | (Running, Success | Failure | Cancelled)
    )
}

impl std::fmt::Debug for JobTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobTable")
            .field("jobs", &self.jobs.len())
            .finish()
    }
}
