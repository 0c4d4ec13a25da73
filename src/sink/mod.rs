//! Destinations for generated batches.

pub mod api;
pub mod clickhouse;
pub mod types;

use async_trait::async_trait;

use crate::batch::Batch;

pub use api::{ApiConfig, ApiConfigBuilder, ApiSink};
pub use clickhouse::{ClickHouseConfig, ClickHouseConfigBuilder, ClickHouseSink};
pub use types::SinkError;

/// Accepts whole batches of records.
///
/// Delivery is all-or-nothing: `Ok(n)` means the batch was accepted,
/// any error means none of it counts. Implementations are shared by every
/// dispatch worker at once.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short label used in diagnostics.
    fn name(&self) -> &str {
        "sink"
    }

    /// Delivers `batch`, returning the number of records inserted.
    async fn deliver(&self, batch: &Batch) -> Result<usize, SinkError>;
}

#[async_trait]
impl<F, Fut> Sink for F
where
    F: Fn(&Batch) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<usize, SinkError>> + Send,
{
    async fn deliver(&self, batch: &Batch) -> Result<usize, SinkError> {
        self(batch).await
    }
}

#[cfg(test)]
mod tests;
