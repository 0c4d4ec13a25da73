//! Data volume helpers: human readable sizes and record size estimation.

use std::fmt;

use chrono::{TimeDelta, Utc};
use rand::RngCore;
use thiserror::Error;

use crate::record::{GenerationError, RecordFactory};

const UNITS: [(&str, u64); 5] = [
    ("TB", 1 << 40),
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("KB", 1 << 10),
    ("B", 1),
];

#[derive(Debug, Error, PartialEq)]
pub enum SizeError {
    #[error("size is empty")]
    Empty,

    #[error("invalid size '{0}'")]
    InvalidNumber(String),

    #[error("average record size must be greater than zero")]
    ZeroAverage,
}

/// Parses sizes such as `1GB`, `500mb`, `1.5 TB` or `4096` into bytes.
///
/// Units are binary multiples. A bare number is a byte count.
pub fn parse_size(input: &str) -> Result<u64, SizeError> {
    let normalized = input.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(SizeError::Empty);
    }

    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            normalized
                .strip_suffix(suffix)
                .map(|number| (number.trim_end(), *multiplier))
        })
        .unwrap_or((normalized.as_str(), 1));

    let value: f64 = number
        .parse()
        .map_err(|_| SizeError::InvalidNumber(input.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(SizeError::InvalidNumber(input.to_string()));
    }

    Ok((value * multiplier as f64) as u64)
}

/// Mean serialized JSON length of `samples` records from `factory`.
pub fn estimate_record_size(
    factory: &dyn RecordFactory,
    samples: usize,
    rng: &mut dyn RngCore,
) -> Result<f64, GenerationError> {
    if samples == 0 {
        return Ok(0.0);
    }

    let now = Utc::now();
    let mut total = 0usize;
    for _ in 0..samples {
        let record = factory.create(now, TimeDelta::zero(), rng)?;
        total += serde_json::to_vec(&record)?.len();
    }
    Ok(total as f64 / samples as f64)
}

/// How much data a run should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Volume {
    Count(u64),
    Bytes(u64),
}

impl Volume {
    /// Number of records to generate, given the average record size in bytes.
    pub fn resolve(self, average_record_size: f64) -> Result<u64, SizeError> {
        match self {
            Volume::Count(count) => Ok(count),
            Volume::Bytes(bytes) => {
                if average_record_size.is_nan() || average_record_size <= 0.0 {
                    return Err(SizeError::ZeroAverage);
                }
                Ok((bytes as f64 / average_record_size) as u64)
            }
        }
    }
}

/// Byte count printed in the largest fitting binary unit, e.g. `1.50 GB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumanBytes(pub f64);

impl fmt::Display for HumanBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (suffix, multiplier) in UNITS {
            let multiplier = multiplier as f64;
            if self.0 >= multiplier && multiplier > 1.0 {
                return write!(f, "{:.2} {}", self.0 / multiplier, suffix);
            }
        }
        write!(f, "{:.0} B", self.0)
    }
}
