//! Async driver that advances a run on tokio timers

use crate::clock::Clock;
use crate::error::PipelineError;
use crate::run::PipelineRun;
use crate::state::PipelineStatus;
use std::time::Duration;
use tokio::sync::watch;

/// Drive `run` until it finishes or `stop` turns `true`
///
/// Starts the run if it is idle, then polls it every `tick` (or sooner, at
/// the running step's deadline). A dropped stop sender is treated as "never
/// stop". Returns the final status.
///
/// # Errors
/// Propagates [`PipelineError`] from the run
pub async fn drive<C>(
    run: &mut PipelineRun,
    clock: &C,
    tick: Duration,
    mut stop: watch::Receiver<bool>,
) -> Result<PipelineStatus, PipelineError>
where
    C: Clock + ?Sized,
{
    if run.status() == PipelineStatus::Idle {
        if *stop.borrow_and_update() {
            run.stop(clock.now())?;
            return Ok(run.status());
        }
        run.start(clock.now())?;
    }

    let mut listening = true;
    loop {
        run.poll(clock.now())?;
        if run.is_finished() {
            break;
        }

        let wait = run
            .next_deadline()
            .map_or(tick, |deadline| deadline.saturating_sub(clock.now()).min(tick));

        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            changed = stop.changed(), if listening => match changed {
                Ok(()) if *stop.borrow_and_update() => {
                    tracing::info!("pipeline stop requested");
                    run.stop(clock.now())?;
                    break;
                }
                Ok(()) => {}
                Err(_) => listening = false,
            },
        }
    }
    Ok(run.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use crate::plan::PlanBuilder;

    #[tokio::test(start_paused = true)]
    async fn drives_to_completion() {
        let clock = TokioClock::new();
        let mut run = PipelineRun::new(PlanBuilder::build().fixed(Duration::from_secs(2)));
        let (_tx, rx) = watch::channel(false);

        let status = drive(&mut run, &clock, Duration::from_millis(250), rx)
            .await
            .unwrap();
        assert_eq!(status, PipelineStatus::Completed);
        assert_eq!(run.progress(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sender_does_not_stop() {
        let clock = TokioClock::new();
        let mut run = PipelineRun::new(PlanBuilder::deployment().fixed(Duration::from_secs(1)));
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let status = drive(&mut run, &clock, Duration::from_millis(100), rx)
            .await
            .unwrap();
        assert_eq!(status, PipelineStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_signal_fails_the_run() {
        let clock = TokioClock::new();
        let mut run = PipelineRun::new(PlanBuilder::build().fixed(Duration::from_secs(10)));
        let (tx, rx) = watch::channel(false);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            tx.send(true).unwrap();
            tx
        });
        let status = drive(&mut run, &clock, Duration::from_secs(1), rx)
            .await
            .unwrap();
        let _tx = stopper.await.unwrap();

        assert_eq!(status, PipelineStatus::Failed);
        assert_eq!(run.steps()[0].status, crate::StepStatus::Completed);
        assert_eq!(run.steps()[1].status, crate::StepStatus::Failed);
    }
}
