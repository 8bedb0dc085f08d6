use azcanvas_pipeline::prelude::*;
use azcanvas_pipeline::{validate_transition, PipelineEvent, StepOutcome};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::time::Duration;

fn rank(status: StepStatus) -> u8 {
    match status {
        StepStatus::Pending => 0,
        StepStatus::Running => 1,
        StepStatus::Completed | StepStatus::Failed => 2,
    }
}

fn pipeline_rank(status: PipelineStatus) -> u8 {
    match status {
        PipelineStatus::Idle => 0,
        PipelineStatus::Running => 1,
        PipelineStatus::Completed | PipelineStatus::Failed => 2,
    }
}

#[test]
fn test_pipeline_transitions() {
    assert!(validate_transition(PipelineStatus::Idle, PipelineStatus::Running).is_ok());
    assert!(validate_transition(PipelineStatus::Running, PipelineStatus::Completed).is_ok());
    assert!(validate_transition(PipelineStatus::Running, PipelineStatus::Failed).is_ok());

    // Invalid
    assert!(validate_transition(PipelineStatus::Idle, PipelineStatus::Completed).is_err());
    assert!(validate_transition(PipelineStatus::Failed, PipelineStatus::Running).is_err());
}

#[test]
fn test_manual_clock_run() {
    let clock = ManualClock::new();
    let mut run = PipelineRun::new(PlanBuilder::build().fixed(Duration::from_secs(2)));
    run.start(clock.now()).unwrap();

    let mut seen = vec![run.progress()];
    while !run.is_finished() {
        clock.advance(Duration::from_millis(700));
        run.poll(clock.now()).unwrap();
        seen.push(run.progress());
    }
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(run.status(), PipelineStatus::Completed);
    assert!(matches!(
        run.events().last(),
        Some(PipelineEvent::PipelineCompleted { at }) if *at == Duration::from_secs(12)
    ));
}

proptest! {
    #[test]
    fn prop_step_transitions_match_table(
        from in prop_oneof![
            Just(StepStatus::Pending),
            Just(StepStatus::Running),
            Just(StepStatus::Completed),
            Just(StepStatus::Failed),
        ],
        to in prop_oneof![
            Just(StepStatus::Pending),
            Just(StepStatus::Running),
            Just(StepStatus::Completed),
            Just(StepStatus::Failed),
        ]
    ) {
        let res = validate_transition(from, to);
        let allowed = from.allowed_transitions();

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
            prop_assert!(rank(to) > rank(from));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_pipeline_transitions_move_forward(
        from in prop_oneof![
            Just(PipelineStatus::Idle),
            Just(PipelineStatus::Running),
            Just(PipelineStatus::Completed),
            Just(PipelineStatus::Failed),
        ],
        to in prop_oneof![
            Just(PipelineStatus::Idle),
            Just(PipelineStatus::Running),
            Just(PipelineStatus::Completed),
            Just(PipelineStatus::Failed),
        ]
    ) {
        if validate_transition(from, to).is_ok() {
            prop_assert!(pipeline_rank(to) > pipeline_rank(from));
        }
    }

    #[test]
    fn prop_randomized_runs_only_move_forward(
        seed in any::<u64>(),
        failure_rate in 0.0f64..=0.5,
        polls in prop::collection::vec(0u64..2_000, 1..40),
        stop_after in prop::option::of(0usize..40),
    ) {
        let plan = PlanBuilder::deployment()
            .randomized(seed, Duration::from_millis(100)..=Duration::from_millis(1_500), failure_rate)
            .unwrap();
        let all_succeed = plan.succeeds();
        let mut run = PipelineRun::new(plan);
        let mut now = Duration::ZERO;
        run.start(now).unwrap();

        let mut previous = run.steps().to_vec();
        let mut previous_status = run.status();
        for (i, delta) in polls.into_iter().enumerate() {
            now += Duration::from_millis(delta);
            if stop_after == Some(i) {
                run.stop(now).unwrap();
            } else {
                run.poll(now).unwrap();
            }

            for (before, after) in previous.iter().zip(run.steps()) {
                prop_assert!(rank(after.status) >= rank(before.status));
                if before.status != StepStatus::Pending {
                    prop_assert_ne!(after.status, StepStatus::Pending);
                }
                if rank(before.status) == 2 {
                    prop_assert_eq!(after.status, before.status);
                }
            }
            prop_assert!(pipeline_rank(run.status()) >= pipeline_rank(previous_status));
            prop_assert!(run.steps().iter().filter(|s| s.status == StepStatus::Running).count() <= 1);

            if run.status() == PipelineStatus::Completed {
                prop_assert!(all_succeed);
                prop_assert!(run.steps().iter().all(|s| s.status == StepStatus::Completed));
                prop_assert_eq!(run.progress(), 100);
            } else {
                prop_assert!(run.progress() < 100);
            }
            previous = run.steps().to_vec();
            previous_status = run.status();
        }
    }

    #[test]
    fn prop_plan_outcome_decides_final_status(seed in any::<u64>(), failure_rate in 0.0f64..=1.0) {
        let plan = PlanBuilder::build()
            .randomized(seed, Duration::from_millis(10)..=Duration::from_millis(20), failure_rate)
            .unwrap();
        let expected = if plan.succeeds() { PipelineStatus::Completed } else { PipelineStatus::Failed };
        let first_failure = plan.steps.iter().position(|s| s.outcome == StepOutcome::Fail);
        let total = plan.total_duration();

        let mut run = PipelineRun::new(plan);
        run.start(Duration::ZERO).unwrap();
        run.poll(total).unwrap();

        prop_assert_eq!(run.status(), expected);
        if let Some(index) = first_failure {
            prop_assert!(run.steps()[index + 1..].iter().all(|s| s.status == StepStatus::Pending));
        }
    }
}
