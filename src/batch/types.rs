use thiserror::Error;

use crate::record::GenerationError;

/// Errors that can occur while planning or generating batches.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Planner or generator was given unusable parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A record in the batch could not be produced.
    ///
    /// The whole batch is discarded.
    #[error("batch {index} generation failed")]
    Generation {
        index: u64,
        #[source]
        source: GenerationError,
    },
}
