use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::batch::BatchError;
use crate::dispatch::DispatchError;
use crate::sink::SinkError;

/// Errors that end a run.
///
/// Individual batch failures are not errors at this level; they are
/// reported through [`RunSummary::failed`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("dispatch failed: {0}")]
    Dispatch(#[source] DispatchError),

    #[error("sink setup failed: {0}")]
    Sink(#[from] SinkError),
}

impl From<BatchError> for RunError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::InvalidConfiguration(msg) => RunError::InvalidConfiguration(msg),
            other => RunError::InvalidConfiguration(other.to_string()),
        }
    }
}

impl From<DispatchError> for RunError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::InvalidConfiguration(msg) => RunError::InvalidConfiguration(msg),
            other => RunError::Dispatch(other),
        }
    }
}

/// Lifecycle of a run. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Planning,
    Dispatching,
    Draining,
    Completed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Planning => "planning",
            RunPhase::Dispatching => "dispatching",
            RunPhase::Draining => "draining",
            RunPhase::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// When a completed run should still be reported as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Partial or total failure is never an error.
    Never,
    /// Error only if batches failed and nothing was inserted.
    #[default]
    AllFailed,
    /// Error as soon as one batch failed.
    AnyFailed,
}

/// Final counters of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: u64,
    pub generated: u64,
    pub inserted: u64,
    pub failed: u64,
    pub batches: u64,
    pub elapsed: Duration,
    /// The run stopped early on request.
    pub cancelled: bool,
}

impl RunSummary {
    /// Average inserted records per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.inserted as f64 / secs
        } else {
            0.0
        }
    }

    /// Records neither inserted nor failed, e.g. skipped after cancellation.
    pub fn skipped(&self) -> u64 {
        self.total
            .saturating_sub(self.inserted)
            .saturating_sub(self.failed)
    }

    pub fn is_failure(&self, policy: FailurePolicy) -> bool {
        match policy {
            FailurePolicy::Never => false,
            FailurePolicy::AllFailed => self.failed > 0 && self.inserted == 0,
            FailurePolicy::AnyFailed => self.failed > 0,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: inserted {}/{} logs, {} failed, {} skipped in {:.1}s ({:.0} logs/sec)",
            if self.cancelled { "Cancelled" } else { "Completed" },
            self.inserted,
            self.total,
            self.failed,
            self.skipped(),
            self.elapsed.as_secs_f64(),
            self.rate()
        )
    }
}
