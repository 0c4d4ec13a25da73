use std::time::Duration;

use thiserror::Error;

/// Errors returned by a sink for one delivery attempt.
///
/// Every variant means the whole batch was rejected.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The endpoint answered with a non-200 status.
    #[error("{sink} rejected batch ({status}): {body}")]
    Rejected {
        sink: &'static str,
        status: u16,
        body: String,
    },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl SinkError {
    /// Classifies a `reqwest` failure, keeping timeouts distinct.
    pub(crate) fn from_request(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            SinkError::Timeout(timeout)
        } else {
            SinkError::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_carries_body() {
        let err = SinkError::Rejected {
            sink: "clickhouse",
            status: 500,
            body: "Code: 62. Syntax error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "clickhouse rejected batch (500): Code: 62. Syntax error"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = SinkError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "request timed out after 60s");
    }
}
