//! The pipeline run state machine
//!
//! A [`PipelineRun`] never reads a clock. Every operation takes `now`, the
//! offset from whatever origin the caller uses, and steps finish at their
//! planned deadline regardless of how late they are polled.

use crate::error::PipelineError;
use crate::plan::{PipelineKind, PipelinePlan, StepOutcome};
use crate::state::{validate_transition, Lifecycle, PipelineStatus, StepStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime state of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
    /// Display name
    pub name: String,
    /// Current status
    pub status: StepStatus,
    /// When the step started running
    pub started_at: Option<Duration>,
    /// When the step completed or failed
    pub finished_at: Option<Duration>,
}

/// Why a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum FailureReason {
    /// A planned step failure
    StepFailed {
        /// Index of the failed step
        index: usize,
    },
    /// Stopped by the caller
    Stopped,
}

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum PipelineEvent {
    /// Run left `idle`
    PipelineStarted {
        at: Duration,
    },
    /// Step began running
    StepStarted {
        index: usize,
        name: String,
        at: Duration,
    },
    /// Step finished successfully
    StepCompleted {
        index: usize,
        name: String,
        at: Duration,
    },
    /// Step failed or was interrupted
    StepFailed {
        index: usize,
        name: String,
        at: Duration,
    },
    /// Every step completed
    PipelineCompleted {
        at: Duration,
    },
    /// Run ended in `failed`
    PipelineFailed {
        at: Duration,
        reason: FailureReason,
    },
}

impl PipelineEvent {
    /// When the event happened
    #[must_use]
    pub const fn at(&self) -> Duration {
        match self {
            Self::PipelineStarted { at }
            | Self::StepStarted { at, .. }
            | Self::StepCompleted { at, .. }
            | Self::StepFailed { at, .. }
            | Self::PipelineCompleted { at }
            | Self::PipelineFailed { at, .. } => *at,
        }
    }
}

/// Serializable view of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct RunSnapshot {
    pub kind: PipelineKind,
    pub status: PipelineStatus,
    pub progress: u8,
    pub current_step: Option<String>,
    pub steps: Vec<StepState>,
    pub started_at: Option<Duration>,
    pub finished_at: Option<Duration>,
}

/// A simulated build or deployment
#[derive(Debug, Clone)]
pub struct PipelineRun {
    plan: PipelinePlan,
    status: PipelineStatus,
    steps: Vec<StepState>,
    current: Option<usize>,
    started_at: Option<Duration>,
    finished_at: Option<Duration>,
    events: Vec<PipelineEvent>,
}

impl PipelineRun {
    /// Idle run of `plan`
    #[must_use]
    pub fn new(plan: PipelinePlan) -> Self {
        let steps = plan
            .steps
            .iter()
            .map(|step| StepState {
                name: step.name.clone(),
                status: StepStatus::Pending,
                started_at: None,
                finished_at: None,
            })
            .collect();
        Self {
            plan,
            status: PipelineStatus::Idle,
            steps,
            current: None,
            started_at: None,
            finished_at: None,
            events: Vec::new(),
        }
    }

    /// The plan being run
    #[must_use]
    pub fn plan(&self) -> &PipelinePlan {
        &self.plan
    }

    /// Top-level status
    #[must_use]
    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    /// Per-step state in plan order
    #[must_use]
    pub fn steps(&self) -> &[StepState] {
        &self.steps
    }

    /// Index of the running step
    #[must_use]
    pub fn current_step(&self) -> Option<usize> {
        self.current
    }

    /// Whether the run reached `completed` or `failed`
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Event log in order of occurrence
    #[must_use]
    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    /// Percentage of steps completed, rounded down
    #[must_use]
    pub fn progress(&self) -> u8 {
        let total = self.steps.len();
        if total == 0 {
            return 0;
        }
        let completed = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count();
        u8::try_from(completed * 100 / total).unwrap_or(100)
    }

    /// When the running step reaches its outcome
    ///
    /// Saturates at [`Duration::MAX`].
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        let index = self.current?;
        let started = self.steps[index].started_at?;
        Some(started.saturating_add(self.plan.steps[index].duration))
    }

    /// Start the first step at `now`
    ///
    /// # Errors
    /// - [`PipelineError::AlreadyStarted`] unless the run is idle
    /// - [`PipelineError::EmptyPlan`] if there is nothing to run
    pub fn start(&mut self, now: Duration) -> Result<(), PipelineError> {
        if self.status != PipelineStatus::Idle {
            return Err(PipelineError::AlreadyStarted(self.status));
        }
        if self.steps.is_empty() {
            return Err(PipelineError::EmptyPlan);
        }

        self.set_status(PipelineStatus::Running)?;
        self.started_at = Some(now);
        self.events.push(PipelineEvent::PipelineStarted { at: now });
        tracing::info!(kind = ?self.plan.kind, steps = self.steps.len(), "pipeline started");
        self.start_step(0, now)
    }

    /// Apply every transition due by `now`
    ///
    /// Returns the number of steps that finished. A finished run is left
    /// untouched.
    ///
    /// # Errors
    /// [`PipelineError::NotStarted`] if the run is still idle
    pub fn poll(&mut self, now: Duration) -> Result<usize, PipelineError> {
        if self.status == PipelineStatus::Idle {
            return Err(PipelineError::NotStarted);
        }

        let mut finished = 0;
        while let Some(deadline) = self.next_deadline() {
            if now < deadline {
                break;
            }
            self.finish_current(deadline)?;
            finished += 1;
        }
        Ok(finished)
    }

    /// Stop the run at `now`
    ///
    /// Steps already due are applied first. The running step, if any, and the
    /// run itself become `failed`; later polls change nothing. Returns whether
    /// the run was still live.
    ///
    /// # Errors
    /// Only on an internal transition-table violation
    pub fn stop(&mut self, now: Duration) -> Result<bool, PipelineError> {
        match self.status {
            PipelineStatus::Completed | PipelineStatus::Failed => return Ok(false),
            PipelineStatus::Running => {
                self.poll(now)?;
                if self.is_finished() {
                    return Ok(false);
                }
            }
            PipelineStatus::Idle => {}
        }

        if let Some(index) = self.current.take() {
            self.set_step(index, StepStatus::Failed)?;
            self.steps[index].finished_at = Some(now);
            self.events.push(PipelineEvent::StepFailed {
                index,
                name: self.steps[index].name.clone(),
                at: now,
            });
        }
        self.fail(now, FailureReason::Stopped)?;
        Ok(true)
    }

    /// Serializable view of the current state
    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            kind: self.plan.kind,
            status: self.status,
            progress: self.progress(),
            current_step: self.current.map(|i| self.steps[i].name.clone()),
            steps: self.steps.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    fn set_status(&mut self, to: PipelineStatus) -> Result<(), PipelineError> {
        validate_transition(self.status, to)?;
        self.status = to;
        Ok(())
    }

    fn set_step(&mut self, index: usize, to: StepStatus) -> Result<(), PipelineError> {
        let step = &mut self.steps[index];
        validate_transition(step.status, to)?;
        step.status = to;
        Ok(())
    }

    fn start_step(&mut self, index: usize, at: Duration) -> Result<(), PipelineError> {
        self.set_step(index, StepStatus::Running)?;
        self.steps[index].started_at = Some(at);
        self.current = Some(index);
        self.events.push(PipelineEvent::StepStarted {
            index,
            name: self.steps[index].name.clone(),
            at,
        });
        tracing::debug!(index, step = %self.steps[index].name, "step started");
        Ok(())
    }

    fn finish_current(&mut self, at: Duration) -> Result<(), PipelineError> {
        let Some(index) = self.current.take() else {
            return Ok(());
        };
        let name = self.steps[index].name.clone();
        self.steps[index].finished_at = Some(at);

        match self.plan.steps[index].outcome {
            StepOutcome::Fail => {
                self.set_step(index, StepStatus::Failed)?;
                self.events.push(PipelineEvent::StepFailed { index, name, at });
                self.fail(at, FailureReason::StepFailed { index })
            }
            StepOutcome::Succeed => {
                self.set_step(index, StepStatus::Completed)?;
                self.events.push(PipelineEvent::StepCompleted { index, name, at });
                tracing::debug!(index, "step completed");
                if index + 1 < self.steps.len() {
                    self.start_step(index + 1, at)
                } else {
                    self.set_status(PipelineStatus::Completed)?;
                    self.finished_at = Some(at);
                    self.events.push(PipelineEvent::PipelineCompleted { at });
                    tracing::info!(kind = ?self.plan.kind, "pipeline completed");
                    Ok(())
                }
            }
        }
    }

    fn fail(&mut self, at: Duration, reason: FailureReason) -> Result<(), PipelineError> {
        self.set_status(PipelineStatus::Failed)?;
        self.finished_at = Some(at);
        self.events.push(PipelineEvent::PipelineFailed { at, reason });
        tracing::warn!(kind = ?self.plan.kind, ?reason, "pipeline failed");
        Ok(())
    }
}
