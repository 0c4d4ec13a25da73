use super::types::BatchError;

/// Position and size of one batch in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchDescriptor {
    pub index: u64,
    pub size: usize,
}

/// Splits a record total into fixed-size batches.
///
/// The last batch absorbs the remainder, so sizes always sum to `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlanner {
    total: u64,
    batch_size: usize,
}

impl BatchPlanner {
    pub fn new(total: u64, batch_size: usize) -> Result<Self, BatchError> {
        if batch_size == 0 {
            return Err(BatchError::InvalidConfiguration(
                "batch size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { total, batch_size })
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches, `ceil(total / batch_size)`.
    pub fn len(&self) -> u64 {
        self.total.div_ceil(self.batch_size as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Returns a fresh iterator over the descriptors, starting at batch 0.
    pub fn iter(&self) -> Descriptors {
        Descriptors {
            next_index: 0,
            remaining: self.total,
            batch_size: self.batch_size,
        }
    }
}

impl<'a> IntoIterator for &'a BatchPlanner {
    type Item = BatchDescriptor;
    type IntoIter = Descriptors;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy descriptor sequence produced by [`BatchPlanner::iter`].
#[derive(Debug, Clone)]
pub struct Descriptors {
    next_index: u64,
    remaining: u64,
    batch_size: usize,
}

impl Iterator for Descriptors {
    type Item = BatchDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let size = self.remaining.min(self.batch_size as u64);
        let descriptor = BatchDescriptor {
            index: self.next_index,
            size: size as usize,
        };
        self.remaining -= size;
        self.next_index += 1;
        Some(descriptor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.remaining.div_ceil(self.batch_size as u64);
        match usize::try_from(left) {
            Ok(left) => (left, Some(left)),
            Err(_) => (usize::MAX, None),
        }
    }
}
