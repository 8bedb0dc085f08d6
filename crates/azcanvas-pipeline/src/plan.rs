//! Step plans for simulated runs
//!
//! A plan fixes, up front, how long each step takes and whether it succeeds.
//! Randomized plans draw both from a seeded [`StdRng`], so a seed always
//! produces the same run.

use crate::error::PipelineError;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Steps of a build pipeline
pub const BUILD_STEPS: &[&str] = &[
    "Validate configuration",
    "Generate Terraform",
    "Terraform init",
    "Terraform validate",
    "Terraform plan",
    "Package artifacts",
];

/// Steps of a deployment pipeline
pub const DEPLOYMENT_STEPS: &[&str] = &[
    "Authenticate",
    "Terraform init",
    "Terraform plan",
    "Terraform apply",
    "Verify resources",
];

/// Default duration of each step in a fixed plan
pub const DEFAULT_STEP_DURATION: Duration = Duration::from_millis(1500);

/// Which pipeline a plan simulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Validate, generate and package
    Build,
    /// Apply to a subscription
    Deployment,
}

/// How a step ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    /// Step completes
    Succeed,
    /// Step fails and the pipeline stops there
    Fail,
}

/// One planned step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPlan {
    /// Display name
    pub name: String,
    /// Time from step start to its outcome
    pub duration: Duration,
    /// Outcome once `duration` has elapsed
    pub outcome: StepOutcome,
}

/// Ordered steps of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePlan {
    /// Pipeline kind
    pub kind: PipelineKind,
    /// Steps in execution order
    pub steps: Vec<StepPlan>,
}

impl PipelinePlan {
    /// Sum of step durations up to and including the first failing step
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        let mut total = Duration::ZERO;
        for step in &self.steps {
            total = total.saturating_add(step.duration);
            if step.outcome == StepOutcome::Fail {
                break;
            }
        }
        total
    }

    /// Whether every step succeeds
    #[must_use]
    pub fn succeeds(&self) -> bool {
        self.steps.iter().all(|s| s.outcome == StepOutcome::Succeed)
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Builds [`PipelinePlan`]s
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    kind: PipelineKind,
    steps: Vec<String>,
    fail_at: Option<usize>,
}

impl PlanBuilder {
    /// Builder for the default build steps
    #[must_use]
    pub fn build() -> Self {
        Self::with_kind(PipelineKind::Build, BUILD_STEPS)
    }

    /// Builder for the default deployment steps
    #[must_use]
    pub fn deployment() -> Self {
        Self::with_kind(PipelineKind::Deployment, DEPLOYMENT_STEPS)
    }

    fn with_kind(kind: PipelineKind, steps: &[&str]) -> Self {
        Self {
            kind,
            steps: steps.iter().map(ToString::to_string).collect(),
            fail_at: None,
        }
    }

    /// Replace the step names
    #[inline]
    #[must_use]
    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = steps.into_iter().map(Into::into).collect();
        self
    }

    /// Make the step at `index` fail in a fixed plan
    #[inline]
    #[must_use]
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Every step takes `duration`
    #[must_use]
    pub fn fixed(self, duration: Duration) -> PipelinePlan {
        let fail_at = self.fail_at;
        let steps = self
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, name)| StepPlan {
                name,
                duration,
                outcome: if Some(index) == fail_at {
                    StepOutcome::Fail
                } else {
                    StepOutcome::Succeed
                },
            })
            .collect();
        PipelinePlan {
            kind: self.kind,
            steps,
        }
    }

    /// Durations drawn from `range`, each step failing with `failure_rate`
    ///
    /// # Errors
    /// [`PipelineError::InvalidPlan`] if the range is inverted or the rate is
    /// outside `0.0..=1.0`
    pub fn randomized(
        self,
        seed: u64,
        range: RangeInclusive<Duration>,
        failure_rate: f64,
    ) -> Result<PipelinePlan, PipelineError> {
        if range.start() > range.end() {
            return Err(PipelineError::InvalidPlan(format!(
                "duration range {:?}..={:?} is inverted",
                range.start(),
                range.end()
            )));
        }
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err(PipelineError::InvalidPlan(format!(
                "failure rate {failure_rate} is outside 0..=1"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let (min, max) = (range.start().as_millis(), range.end().as_millis());
        let min = u64::try_from(min).unwrap_or(u64::MAX);
        let max = u64::try_from(max).unwrap_or(u64::MAX);

        let steps = self
            .steps
            .into_iter()
            .map(|name| StepPlan {
                name,
                duration: Duration::from_millis(rng.random_range(min..=max)),
                outcome: if rng.random_bool(failure_rate) {
                    StepOutcome::Fail
                } else {
                    StepOutcome::Succeed
                },
            })
            .collect();
        Ok(PipelinePlan {
            kind: self.kind,
            steps,
        })
    }
}
