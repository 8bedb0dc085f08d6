//! Error types for simulated pipelines

use crate::state::PipelineStatus;

/// Pipeline errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Status change not in the transition table
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition {
        from: &'static str,
        to: &'static str,
    },

    /// Poll before start
    #[error("pipeline has not been started")]
    NotStarted,

    /// Start on a pipeline that already left `idle`
    #[error("pipeline already started (status: {0})")]
    AlreadyStarted(PipelineStatus),

    /// Plan without steps
    #[error("pipeline plan has no steps")]
    EmptyPlan,

    /// Plan parameters out of range
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
}
