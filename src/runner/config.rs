// src/runner/config.rs

use std::time::Duration;

use derive_builder::Builder;

use super::types::{FailurePolicy, RunError};
use crate::batch::TimeWindow;
use crate::dispatch::PoolConfig;

/// Everything a [`Runner`](super::Runner) needs besides its factory and sink.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct RunConfig {
    /// Number of records to generate
    pub(crate) total: u64,

    /// Records per batch
    #[builder(default = "10_000")]
    pub(crate) batch_size: usize,

    /// Concurrent deliveries
    #[builder(default = "4")]
    pub(crate) workers: usize,

    /// Generated batches allowed to wait for a worker
    #[builder(default = "1")]
    pub(crate) queue_depth: usize,

    /// Timestamps are spread over this many days before now
    #[builder(default = "30")]
    pub(crate) days: u32,

    /// Fixed window overriding `days`
    #[builder(default, setter(into, strip_option))]
    pub(crate) window: Option<TimeWindow>,

    /// Makes generated content reproducible
    #[builder(default, setter(into, strip_option))]
    pub(crate) seed: Option<u64>,

    #[builder(default = "Duration::from_secs(5)")]
    pub(crate) progress_interval: Duration,

    #[builder(default)]
    pub(crate) failure_policy: FailurePolicy,
}

impl RunConfig {
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[inline]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.workers, self.queue_depth)
    }

    /// Rejects settings that would make the run impossible.
    pub fn validate(&self) -> Result<(), RunError> {
        if self.batch_size == 0 {
            return Err(RunError::InvalidConfiguration(
                "batch size must be greater than zero".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(RunError::InvalidConfiguration(
                "worker count must be greater than zero".to_string(),
            ));
        }
        if self.queue_depth == 0 {
            return Err(RunError::InvalidConfiguration(
                "queue depth must be greater than zero".to_string(),
            ));
        }
        if self.progress_interval.is_zero() {
            return Err(RunError::InvalidConfiguration(
                "progress interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
