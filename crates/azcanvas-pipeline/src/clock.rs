//! Injected time sources
//!
//! Pipelines never read the wall clock themselves. Callers pass `now` in,
//! usually from one of these.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Monotonic time elapsed since the clock's origin
pub trait Clock: Send + Sync {
    /// Current offset from the origin
    fn now(&self) -> Duration;
}

/// Clock that only moves when told to
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Clock at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(by);
    }

    /// Jump to `at`; ignored if it would move backwards
    pub fn set(&self, at: Duration) {
        let mut now = self.now.lock();
        if at > *now {
            *now = at;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// Clock backed by tokio's `Instant`, so it follows paused test time
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    /// Clock whose origin is now
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_and_monotonic() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_secs(2));
        assert_eq!(other.now(), Duration::from_secs(2));

        other.set(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(2));
        other.set(Duration::from_secs(5));
        assert_eq!(clock.now(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_paused_time() {
        let clock = TokioClock::new();
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert!(clock.now() >= Duration::from_millis(1500));
    }
}
