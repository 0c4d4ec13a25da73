// src/dispatch/config.rs

use derive_builder::Builder;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct PoolConfig {
    /// Number of concurrent delivery tasks
    #[builder(default = "4")]
    pub(crate) workers: usize,

    /// Batches that may wait for a free worker before `submit` blocks
    #[builder(default = "1")]
    pub(crate) queue_depth: usize,
}

impl PoolConfig {
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        PoolConfig {
            workers,
            queue_depth,
        }
    }

    /// Returns the number of delivery workers
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the submission queue capacity
    #[inline]
    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// Upper bound on batches held by the pool at once.
    #[inline]
    pub fn max_outstanding(&self) -> usize {
        self.workers + self.queue_depth
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            workers: 4,
            queue_depth: 1,
        }
    }
}
