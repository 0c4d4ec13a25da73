use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by the generator, the workers and the progress tracker.
///
/// All counters only grow. Each update is a single atomic add.
#[derive(Debug)]
pub struct RunState {
    generated: AtomicU64,
    inserted: AtomicU64,
    failed: AtomicU64,
    started: Instant,
}

impl RunState {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(started: Instant) -> Self {
        Self {
            generated: AtomicU64::new(0),
            inserted: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            started,
        }
    }

    pub fn record_generated(&self, count: u64) {
        self.generated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_inserted(&self, count: u64) {
        self.inserted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_failed(&self, count: u64) {
        self.failed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn inserted(&self) -> u64 {
        self.inserted.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
