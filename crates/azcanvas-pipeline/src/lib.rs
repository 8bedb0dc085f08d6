//! Azure Canvas Pipeline
//!
//! Simulated build and deployment pipelines. Nothing is actually built or
//! deployed: a [`PipelinePlan`] decides up front how long each step takes and
//! whether it succeeds, and a [`PipelineRun`] replays that plan against an
//! injected clock.
//!
//! # Overview
//!
//! - **state**: forward-only transition tables for [`PipelineStatus`] and [`StepStatus`]
//! - **plan**: fixed or seeded-random [`PipelinePlan`]s
//! - **run**: the [`PipelineRun`] state machine with an event log
//! - **clock** / **driver**: [`ManualClock`] for tests, [`TokioClock`] and [`drive`] for live runs
//!
//! # Example
//!
//! ```rust
//! use azcanvas_pipeline::{PipelineRun, PipelineStatus, PlanBuilder};
//! use std::time::Duration;
//!
//! let plan = PlanBuilder::deployment().fixed(Duration::from_secs(1));
//! let mut run = PipelineRun::new(plan);
//! run.start(Duration::ZERO).unwrap();
//! run.poll(Duration::from_secs(60)).unwrap();
//!
//! assert_eq!(run.status(), PipelineStatus::Completed);
//! assert_eq!(run.progress(), 100);
//! ```

#![warn(missing_docs)]

pub mod clock;
pub mod driver;
pub mod error;
pub mod plan;
pub mod run;
pub mod state;

// Re-exports
pub use clock::{Clock, ManualClock, TokioClock};
pub use driver::drive;
pub use error::PipelineError;
pub use plan::{
    PipelineKind, PipelinePlan, PlanBuilder, StepOutcome, StepPlan, BUILD_STEPS,
    DEFAULT_STEP_DURATION, DEPLOYMENT_STEPS,
};
pub use run::{FailureReason, PipelineEvent, PipelineRun, RunSnapshot, StepState};
pub use state::{validate_transition, Lifecycle, PipelineStatus, StepStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for simulated pipelines
    pub use crate::{
        drive, Clock, Lifecycle, ManualClock, PipelineError, PipelineRun, PipelineStatus,
        PlanBuilder, StepStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
