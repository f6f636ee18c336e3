//! Job orchestration: records, lifecycle state machine, table and supervisor.
//!
//! A job is a tracked asynchronous execution. The [`JobTable`] is the
//! single source of truth for job state; the [`JobSupervisor`] creates
//! jobs, spawns their workers and is the only writer of state
//! transitions. Callers hold a [`JobTicket`] and poll the table (or
//! subscribe to its watch channel) to observe progress.
//!
//! # Lifecycle
//!
//! ```text
//! Queued ──▶ Running ──▶ Success | Failure
//!    │           │
//!    └───────────┴─────▶ Cancelled   (explicit termination)
//! ```
//!
//! Transitions are monotonic; the first terminal write wins and later
//! reports are rejected by the table.

mod record;
mod state;
mod supervisor;
pub(crate) mod table;

pub use record::{JobFailure, JobId, JobRecord, JobTicket};
pub use state::JobState;
pub use supervisor::JobSupervisor;
pub use table::JobTable;
