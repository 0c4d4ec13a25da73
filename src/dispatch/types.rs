use thiserror::Error;

/// Errors raised by the dispatch pool itself.
///
/// Sink failures never show up here; they are counted per batch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Every worker has exited, so nothing can accept the batch.
    #[error("dispatch channel closed")]
    ChannelClosed,

    #[error("{0} worker(s) panicked")]
    WorkerPanicked(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DispatchError::ChannelClosed.to_string(),
            "dispatch channel closed"
        );
        assert_eq!(
            DispatchError::WorkerPanicked(2).to_string(),
            "2 worker(s) panicked"
        );
    }
}
