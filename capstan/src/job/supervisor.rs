//! The job supervisor - creates jobs and drives their workers.
//!
//! The supervisor is the only writer of job state transitions. Each
//! started job runs on its own tokio task (the job worker); the worker
//! reports Running and then exactly one terminal state back into the
//! table. Cancellation is cooperative: `terminate` cancels the worker's
//! token and the first terminal write wins.

use super::record::{JobFailure, JobId, JobRecord, JobTicket};
use crate::error::CoreError;
use crate::job::table::JobTable;
use crate::plugin::{CommandBody, CommandContext, CommandResult};
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Creates jobs, spawns their workers and funnels state transitions into
/// the job table.
pub struct JobSupervisor {
    table: Arc<JobTable>,
    cancellations: Arc<DashMap<JobId, CancellationToken>>,
}

impl JobSupervisor {
    /// Creates a supervisor writing into the given table.
    pub fn new(table: Arc<JobTable>) -> Self {
        Self {
            table,
            cancellations: Arc::new(DashMap::new()),
        }
    }

    /// The table this supervisor writes into.
    pub fn table(&self) -> &Arc<JobTable> {
        &self.table
    }

    /// Creates a job in the Queued state and returns its record immediately.
    pub fn create(&self, description: impl Into<String>) -> JobRecord {
        let record = self.table.create(description);
        info!(job_id = %record.id, description = %record.description, "Job created");
        record
    }

    /// Starts the asynchronous execution of a command body for the job.
    ///
    /// Returns a ticket without waiting for the worker. The worker marks
    /// the job Running, drives the body, and reports the terminal state;
    /// if the job was terminated while still queued the body never runs.
    pub fn start(
        &self,
        job_id: &JobId,
        body: Arc<dyn CommandBody>,
        environment: &str,
        arguments: Vec<String>,
    ) -> JobTicket {
        let token = CancellationToken::new();
        self.cancellations.insert(job_id.clone(), token.clone());

        let table = Arc::clone(&self.table);
        let cancellations = Arc::clone(&self.cancellations);
        let id = job_id.clone();
        let environment = environment.to_string();

        tokio::spawn(async move {
            run_worker(table, cancellations, id, body, environment, arguments, token).await;
        });

        JobTicket::new(job_id.clone())
    }

    /// Creates a job and starts it in one step.
    pub fn run(
        &self,
        description: impl Into<String>,
        body: Arc<dyn CommandBody>,
        environment: &str,
        arguments: Vec<String>,
    ) -> JobTicket {
        let record = self.create(description);
        self.start(&record.id, body, environment, arguments)
    }

    /// Requests cooperative cancellation of a job.
    ///
    /// Legal from Queued or Running: cancels the worker's token and
    /// transitions the job to Cancelled. A job already in a terminal state
    /// is left untouched (termination is idempotent); an unknown id fails
    /// with `JobNotFound`.
    pub fn terminate(&self, job_id: &JobId) -> Result<(), CoreError> {
        let record = self.table.find(job_id)?;
        if record.state.is_terminal() {
            debug!(job_id = %job_id, state = %record.state, "Terminate on terminal job is a no-op");
            return Ok(());
        }

        if let Some(token) = self.cancellations.get(job_id) {
            token.cancel();
        }

        match self.table.cancel(job_id) {
            Ok(()) => {
                info!(job_id = %job_id, "Job cancelled");
            }
            Err(rejected) => {
                // The worker recorded a terminal state first; its write wins.
                debug!(job_id = %job_id, current = ?rejected.current, "Cancellation lost the terminal race");
            }
        }
        Ok(())
    }

    /// Cancels every non-terminal job, e.g. on process shutdown.
    pub fn shutdown(&self) {
        let active = self.table.active();
        if active.is_empty() {
            return;
        }

        info!(count = active.len(), "Cancelling active jobs for shutdown");
        for record in active {
            if let Some(token) = self.cancellations.get(&record.id) {
                token.cancel();
            }
            if self.table.cancel(&record.id).is_ok() {
                warn!(job_id = %record.id, "Job cancelled by shutdown");
            }
        }
    }
}

impl std::fmt::Debug for JobSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSupervisor")
            .field("jobs", &self.table.len())
            .field("workers", &self.cancellations.len())
            .finish()
    }
}

/// The job worker: one independent unit of concurrent execution per job.
#[allow(clippy::too_many_arguments)]
async fn run_worker(
    table: Arc<JobTable>,
    cancellations: Arc<DashMap<JobId, CancellationToken>>,
    id: JobId,
    body: Arc<dyn CommandBody>,
    environment: String,
    arguments: Vec<String>,
    token: CancellationToken,
) {
    if table.mark_running(&id).is_err() {
        // Terminated before the worker picked the job up; never run the body.
        debug!(job_id = %id, "Job was terminal before its worker started");
        cancellations.remove(&id);
        return;
    }
    info!(job_id = %id, environment = %environment, "Job running");

    let mut ctx = CommandContext::new(id.clone(), environment, arguments, token.clone());
    let result = tokio::select! {
        biased;

        _ = token.cancelled() => CommandResult::Cancelled,
        result = body.execute(&mut ctx) => result,
    };

    match result {
        CommandResult::Success(value) => match table.complete(&id, value) {
            Ok(()) => info!(job_id = %id, "Job completed successfully"),
            Err(rejected) => {
                debug!(job_id = %id, current = ?rejected.current, "Success report lost the terminal race")
            }
        },
        CommandResult::Failed(failure) => {
            let message = failure.message.clone();
            match table.fail(&id, JobFailure::new(failure.message)) {
                Ok(()) => error!(job_id = %id, error = %message, "Job failed"),
                Err(rejected) => {
                    debug!(job_id = %id, current = ?rejected.current, "Failure report lost the terminal race")
                }
            }
        }
        CommandResult::Cancelled => match table.cancel(&id) {
            Ok(()) => warn!(job_id = %id, "Job cancelled"),
            Err(rejected) => {
                debug!(job_id = %id, current = ?rejected.current, "Cancel report lost the terminal race")
            }
        },
    }

    cancellations.remove(&id);
}
