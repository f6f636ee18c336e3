//! Commands and their execution bodies.
//!
//! A command is the smallest invocable unit of a plugin. Its execution
//! body is opaque to the orchestration core: the core owns the job
//! bookkeeping around an invocation, the body owns the actual work.

use crate::job::JobId;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Execution context handed to a command body.
///
/// Carries the target environment, the caller-supplied arguments, and the
/// cooperative cancellation token for the owning job worker.
pub struct CommandContext {
    job_id: JobId,
    environment: String,
    arguments: Vec<String>,
    cancellation: CancellationToken,
}

impl CommandContext {
    pub(crate) fn new(
        job_id: JobId,
        environment: impl Into<String>,
        arguments: Vec<String>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            job_id,
            environment: environment.into(),
            arguments,
            cancellation,
        }
    }

    /// Id of the job tracking this invocation.
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Name of the environment the command acts upon.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Caller-supplied arguments (empty unless provided).
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Returns true once termination has been requested.
    ///
    /// Bodies should check this at safe points and finish with
    /// [`CommandResult::Cancelled`]; a body that never checks runs to its
    /// natural completion.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Suspends until termination is requested.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("job_id", &self.job_id)
            .field("environment", &self.environment)
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// Failure payload reported by a command body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    /// Human-readable failure description.
    pub message: String,
}

impl CommandFailure {
    /// Creates a failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outcome of a command body execution.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// Normal completion with a result payload.
    Success(serde_json::Value),

    /// The body failed; the job records the structured error.
    Failed(CommandFailure),

    /// The body observed a cancellation request and stopped.
    Cancelled,
}

impl CommandResult {
    /// Short token for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// The execution body of a command.
///
/// Implementations perform the actual provisioning/configuration work
/// against the environment named in the context. The surrounding job
/// lifecycle (state transitions, cancellation, result recording) is owned
/// by the job supervisor.
pub trait CommandBody: Send + Sync + 'static {
    /// Executes the command against the context's environment.
    fn execute<'a>(
        &'a self,
        ctx: &'a mut CommandContext,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + 'a>>;
}

/// The smallest invocable unit of a plugin.
///
/// Owned by a plugin or by one of its components, never both. Invoking a
/// command produces a job.
#[derive(Clone)]
pub struct Command {
    id: String,
    description: String,
    body: Arc<dyn CommandBody>,
}

impl Command {
    /// Creates a command with the given id, description and body.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        body: Arc<dyn CommandBody>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            body,
        }
    }

    /// Unique id of this command within its owner.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The execution body, shared with the job worker that runs it.
    pub fn body(&self) -> Arc<dyn CommandBody> {
        Arc::clone(&self.body)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
