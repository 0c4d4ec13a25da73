use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::{MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::dispatch::RunState;

/// Point-in-time view of run progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub inserted: u64,
    pub failed: u64,
    pub total: u64,
    pub elapsed: Duration,
    /// Records inserted per second; 0 before any time has passed.
    pub rate: f64,
    /// Seconds left at the current rate; `None` while the rate is 0.
    pub eta_secs: Option<f64>,
}

impl ProgressSnapshot {
    pub fn compute(inserted: u64, failed: u64, total: u64, elapsed: Duration) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let rate = if elapsed_secs > 0.0 {
            inserted as f64 / elapsed_secs
        } else {
            0.0
        };
        let eta_secs = if rate > 0.0 {
            Some(total.saturating_sub(inserted) as f64 / rate)
        } else {
            None
        };

        Self {
            inserted,
            failed,
            total,
            elapsed,
            rate,
            eta_secs,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.inserted as f64 / self.total as f64
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Progress: {}/{} ({:.1}%) | Rate: {:.0} logs/sec | ETA: ",
            self.inserted,
            self.total,
            self.percent(),
            self.rate
        )?;
        match self.eta_secs {
            Some(eta) => write!(f, "{:.0}s", eta),
            None => f.write_str("unknown"),
        }
    }
}

/// Turns the shared run counters into periodic progress reports.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    state: Arc<RunState>,
    total: u64,
    interval: Duration,
}

impl ProgressTracker {
    pub fn new(state: Arc<RunState>, total: u64, interval: Duration) -> Self {
        Self {
            state,
            total,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::compute(
            self.state.inserted(),
            self.state.failed(),
            self.total,
            self.state.elapsed(),
        )
    }

    /// Emits a snapshot every interval until `done` is cancelled.
    ///
    /// The first snapshot arrives one interval after the call.
    pub fn snapshots(&self, done: CancellationToken) -> impl Stream<Item = ProgressSnapshot> + use<> {
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let tracker = self.clone();

        futures::stream::unfold((ticker, tracker, done), |(mut ticker, tracker, done)| async move {
            tokio::select! {
                _ = done.cancelled() => None,
                _ = ticker.tick() => {
                    let snapshot = tracker.snapshot();
                    Some((snapshot, (ticker, tracker, done)))
                }
            }
        })
    }

    /// Logs every snapshot until `done` is cancelled.
    pub async fn report(self, done: CancellationToken) {
        let mut snapshots = Box::pin(self.snapshots(done));
        while let Some(snapshot) = snapshots.next().await {
            info!("{}", snapshot);
        }
    }
}
