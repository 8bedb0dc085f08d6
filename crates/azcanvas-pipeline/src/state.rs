//! Status enums and their transition tables
//!
//! Both tables are forward-only: no status is reachable again once left, and
//! terminal statuses have no outgoing transitions.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};

/// A status with a fixed transition table
pub trait Lifecycle: Copy + Eq + Debug + 'static {
    /// Statuses reachable from `self` in one step
    fn allowed_transitions(self) -> &'static [Self];

    /// Lowercase name
    fn as_str(self) -> &'static str;

    /// Whether no transition leaves this status
    fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// Check a transition against the table
///
/// # Errors
/// [`PipelineError::IllegalTransition`] if `to` is not reachable from `from`
pub fn validate_transition<S: Lifecycle>(from: S, to: S) -> Result<(), PipelineError> {
    if from.allowed_transitions().contains(&to) {
        Ok(())
    } else {
        Err(PipelineError::IllegalTransition {
            from: from.as_str(),
            to: to.as_str(),
        })
    }
}

/// Top-level pipeline status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    /// Not started
    #[default]
    Idle,
    /// Steps are executing
    Running,
    /// Every step completed
    Completed,
    /// A step failed or the run was stopped
    Failed,
}

impl Lifecycle for PipelineStatus {
    fn allowed_transitions(self) -> &'static [Self] {
        use PipelineStatus::*;
        match self {
            Idle => &[Running, Failed],
            Running => &[Completed, Failed],
            Completed | Failed => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl Display for PipelineStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-step status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Waiting for earlier steps
    #[default]
    Pending,
    /// Executing
    Running,
    /// Finished successfully
    Completed,
    /// Finished unsuccessfully or interrupted by a stop
    Failed,
}

impl Lifecycle for StepStatus {
    fn allowed_transitions(self) -> &'static [Self] {
        use StepStatus::*;
        match self {
            Pending => &[Running],
            Running => &[Completed, Failed],
            Completed | Failed => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl Display for StepStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(PipelineStatus::Completed.is_terminal());
        assert!(PipelineStatus::Failed.is_terminal());
        assert!(!PipelineStatus::Idle.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
        assert!(!StepStatus::Pending.is_terminal());
    }

    #[test]
    fn nothing_returns_to_pending() {
        for from in [StepStatus::Running, StepStatus::Completed, StepStatus::Failed] {
            assert!(validate_transition(from, StepStatus::Pending).is_err());
        }
    }

    #[test]
    fn illegal_transition_names_both_ends() {
        let err = validate_transition(PipelineStatus::Completed, PipelineStatus::Running).unwrap_err();
        assert_eq!(err.to_string(), "illegal transition: completed -> running");
    }
}
