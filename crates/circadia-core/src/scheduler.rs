//! Cooperative autoplay tick scheduling.
//!
//! At most one tick is ever pending. Scheduling arms a single deadline;
//! canceling drops it, so a tick that was never armed can never fire.
//! The driver awaits [`TickScheduler::fired`] next to its command
//! channel, which is where control input gets processed between ticks.

use std::future;
use std::time::Duration;

use tokio::time::Instant;

/// A cancelable single-slot tick schedule.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval: Duration,
    deadline: Option<Instant>,
}

impl TickScheduler {
    /// Create an idle scheduler that spaces ticks `interval` apart.
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Create an idle scheduler from a frame duration in milliseconds.
    pub const fn from_millis(frame_duration_ms: u64) -> Self {
        Self::new(Duration::from_millis(frame_duration_ms))
    }

    /// Arm the next tick one interval from now. Re-arming an already
    /// pending tick leaves its deadline alone.
    pub fn schedule(&mut self) {
        if self.deadline.is_none() {
            let now = Instant::now();
            self.deadline = Some(now.checked_add(self.interval).unwrap_or(now));
        }
    }

    /// Drop the pending tick, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a tick is pending.
    pub const fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    /// The spacing between ticks.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the pending tick. Never completes while nothing is
    /// scheduled. The slot is cleared once the tick fires.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_after_interval() {
        let mut scheduler = TickScheduler::from_millis(100);
        scheduler.schedule();
        assert!(scheduler.is_scheduled());

        let start = Instant::now();
        scheduler.fired().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(!scheduler.is_scheduled());
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_tick_never_fires() {
        let mut scheduler = TickScheduler::from_millis(10);
        scheduler.schedule();
        scheduler.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(5), scheduler.fired()).await;
        assert!(outcome.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_keeps_first_deadline() {
        let mut scheduler = TickScheduler::from_millis(100);
        scheduler.schedule();
        tokio::time::advance(Duration::from_millis(60)).await;
        scheduler.schedule();

        let start = Instant::now();
        scheduler.fired().await;
        assert!(start.elapsed() <= Duration::from_millis(40));
    }
}
