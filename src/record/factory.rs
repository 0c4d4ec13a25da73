use chrono::{DateTime, TimeDelta, Utc};
use rand::RngCore;

use super::types::{GenerationError, LogRecord};

/// Produces one record for a logical point in time.
///
/// Implementations must not keep mutable state between calls: batches are
/// generated concurrently and every call receives its own random source.
pub trait RecordFactory: Send + Sync {
    /// Builds the record stamped at `base + offset`.
    fn create(
        &self,
        base: DateTime<Utc>,
        offset: TimeDelta,
        rng: &mut dyn RngCore,
    ) -> Result<LogRecord, GenerationError>;
}

impl<F> RecordFactory for F
where
    F: Fn(DateTime<Utc>, TimeDelta, &mut dyn RngCore) -> Result<LogRecord, GenerationError>
        + Send
        + Sync,
{
    fn create(
        &self,
        base: DateTime<Utc>,
        offset: TimeDelta,
        rng: &mut dyn RngCore,
    ) -> Result<LogRecord, GenerationError> {
        self(base, offset, rng)
    }
}

/// Adds `offset` to `base`, failing instead of overflowing.
pub fn stamp(base: DateTime<Utc>, offset: TimeDelta) -> Result<DateTime<Utc>, GenerationError> {
    base.checked_add_signed(offset)
        .ok_or_else(|| GenerationError::Other(format!("timestamp {} + {} overflows", base, offset)))
}
