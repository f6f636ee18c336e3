//! Job lifecycle states.

use serde::Serialize;

/// Lifecycle state of a job.
///
/// Transitions are monotonic and one-directional:
/// Queued → Running → {Success, Failure}, with Cancelled reachable from
/// Queued or Running via explicit termination. Terminal states are final.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Created but not yet picked up by its worker.
    #[default]
    Queued,

    /// The job worker is executing the command body.
    Running,

    /// Completed normally; the record carries a result payload.
    Success,

    /// The command body reported a failure; the record carries the error.
    Failure,

    /// Terminated before reaching a natural completion.
    Cancelled,
}

impl JobState {
    /// Returns true once the job can no longer transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Cancelled)
    }

    /// Returns true while the job counts toward `active()`.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    /// Stable string token used at the boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Success.is_terminal());
        assert!(JobState::Failure.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
    }

    #[test]
    fn test_active_states() {
        assert!(JobState::Queued.is_active());
        assert!(JobState::Running.is_active());
        assert!(!JobState::Success.is_active());
        assert!(!JobState::Failure.is_active());
        assert!(!JobState::Cancelled.is_active());
    }

    #[test]
    fn test_display_tokens_are_stable() {
        assert_eq!(JobState::Queued.to_string(), "queued");
        assert_eq!(JobState::Running.to_string(), "running");
        assert_eq!(JobState::Success.to_string(), "success");
        assert_eq!(JobState::Failure.to_string(), "failure");
        assert_eq!(JobState::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_serialize_matches_display() {
        let json = serde_json::to_string(&JobState::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }

    #[test]
    fn test_default_is_queued() {
        assert_eq!(JobState::default(), JobState::Queued);
    }
}
