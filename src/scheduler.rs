// Cycle scheduler — run once at startup, then on a fixed interval.
//
// A single cooperative loop polls once per second and starts a new
// cycle when the interval has elapsed since the last cycle *started*.
// Cycles run on the loop itself, so they never overlap: a cycle that
// overruns the interval just delays the next poll.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::info;

/// Wall-time granularity of the elapsed-interval check.
const POLL_TICK: Duration = Duration::from_secs(1);

/// Fixed-interval ticker that owns the run loop.
pub struct Scheduler {
    interval: Duration,
    poll: Duration,
}

impl Scheduler {
    pub fn new(interval_minutes: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_minutes * 60),
            poll: POLL_TICK,
        }
    }

    /// Whether the interval has elapsed since the last cycle started.
    pub fn is_due(&self, last_started: Instant, now: Instant) -> bool {
        now.duration_since(last_started) >= self.interval
    }

    /// Run `cycle` immediately, then forever on the interval. Only
    /// process termination stops the loop.
    pub async fn run<F, Fut>(&self, mut cycle: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut last_started = Instant::now();
        cycle().await;

        info!(
            interval_minutes = self.interval.as_secs() / 60,
            "Scheduled cycle every {} minutes",
            self.interval.as_secs() / 60
        );

        loop {
            sleep(self.poll).await;
            let now = Instant::now();
            if self.is_due(last_started, now) {
                last_started = now;
                cycle().await;
            }
        }
    }
}
