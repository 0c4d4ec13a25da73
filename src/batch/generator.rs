use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::planner::BatchDescriptor;
use super::types::BatchError;
use crate::record::{LogRecord, RecordFactory};

// Spreads consecutive batch indexes across the seed space.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Closed time range that record timestamps are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, BatchError> {
        if end < start {
            return Err(BatchError::InvalidConfiguration(format!(
                "time window ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` days leading up to `now`.
    pub fn last_days(days: u32, now: DateTime<Utc>) -> Result<Self, BatchError> {
        let span = TimeDelta::try_days(i64::from(days)).ok_or_else(|| {
            BatchError::InvalidConfiguration(format!("{} days is out of range", days))
        })?;
        let start = now.checked_sub_signed(span).ok_or_else(|| {
            BatchError::InvalidConfiguration(format!("{} days before {} is out of range", days, now))
        })?;
        Self::new(start, now)
    }

    #[inline]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Draws `U(0,1) * span`, independently for every call.
    pub fn sample_offset(&self, rng: &mut dyn RngCore) -> TimeDelta {
        let micros = self.span().num_microseconds().unwrap_or(i64::MAX);
        let fraction: f64 = rng.r#gen();
        TimeDelta::microseconds((fraction * micros as f64) as i64)
    }
}

/// Records generated for one descriptor.
#[derive(Debug, Clone)]
pub struct Batch {
    index: u64,
    records: Vec<LogRecord>,
}

impl Batch {
    pub fn new(index: u64, records: Vec<LogRecord>) -> Self {
        Self { index, records }
    }

    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    #[inline]
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<LogRecord> {
        self.records
    }
}

/// Turns batch descriptors into batches of records.
///
/// Holds no mutable state: every call builds its own RNG, so one generator
/// can be shared across threads. With a seed, the RNG of batch `i` is
/// derived from `(seed, i)` and output is reproducible.
#[derive(Clone)]
pub struct BatchGenerator {
    window: TimeWindow,
    factory: Arc<dyn RecordFactory>,
    seed: Option<u64>,
}

impl BatchGenerator {
    pub fn new(window: TimeWindow, factory: Arc<dyn RecordFactory>) -> Self {
        Self {
            window,
            factory,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn generate(&self, descriptor: BatchDescriptor) -> Result<Batch, BatchError> {
        let mut rng = self.rng_for(descriptor.index);
        self.generate_with(descriptor, &mut rng)
    }

    /// Same as [`generate`](Self::generate) with a caller-supplied RNG.
    pub fn generate_with(
        &self,
        descriptor: BatchDescriptor,
        rng: &mut dyn RngCore,
    ) -> Result<Batch, BatchError> {
        let mut records = Vec::with_capacity(descriptor.size);
        for _ in 0..descriptor.size {
            let offset = self.window.sample_offset(rng);
            let record = self
                .factory
                .create(self.window.start, offset, rng)
                .map_err(|source| BatchError::Generation {
                    index: descriptor.index,
                    source,
                })?;
            records.push(record);
        }
        Ok(Batch::new(descriptor.index, records))
    }

    fn rng_for(&self, index: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ index.wrapping_add(1).wrapping_mul(SEED_STRIDE)),
            None => StdRng::from_entropy(),
        }
    }
}

impl fmt::Debug for BatchGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchGenerator")
            .field("window", &self.window)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
