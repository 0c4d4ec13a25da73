// src/sink/clickhouse.rs

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use derive_builder::Builder;
use reqwest::StatusCode;
use tracing::debug;

use super::Sink;
use super::types::SinkError;
use crate::batch::Batch;
use crate::record::LogRecord;

const COLUMNS: &str =
    "id, timestamp, level, app_name, message, metadata, trace_id, span_id, host, environment";

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ClickHouseConfig {
    /// HTTP interface host
    #[builder(default = "\"localhost\".to_string()")]
    pub(crate) host: String,

    /// HTTP interface port
    #[builder(default = "8123")]
    pub(crate) port: u16,

    #[builder(default = "\"admin\".to_string()")]
    pub(crate) user: String,

    #[builder(default = "\"admin\".to_string()")]
    pub(crate) password: String,

    /// Database holding the `logs` table
    #[builder(default = "\"logfordev\".to_string()")]
    pub(crate) database: String,

    /// Timeout for a whole INSERT statement
    #[builder(default = "Duration::from_secs(120)")]
    pub(crate) timeout: Duration,
}

impl ClickHouseConfig {
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        ClickHouseConfig {
            host: "localhost".to_string(),
            port: 8123,
            user: "admin".to_string(),
            password: "admin".to_string(),
            database: "logfordev".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Writes each batch as one bulk `INSERT` over the ClickHouse HTTP interface.
pub struct ClickHouseSink {
    config: ClickHouseConfig,
    client: reqwest::Client,
    endpoint: String,
}

impl ClickHouseSink {
    pub fn new(config: ClickHouseConfig) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SinkError::Transport)?;
        let endpoint = format!("http://{}:{}/", config.host, config.port);

        Ok(Self {
            config,
            client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Builds the single statement inserting every record.
    pub fn insert_statement(&self, records: &[LogRecord]) -> String {
        let mut sql = format!(
            "INSERT INTO {}.logs ({}) VALUES ",
            self.config.database, COLUMNS
        );
        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            // Writing into a String cannot fail.
            let _ = write!(
                sql,
                "('{}', '{}', '{}', '{}', '{}', '{}', '{}', '{}', '{}', '{}')",
                escape(&record.id),
                record.formatted_timestamp(),
                record.level.as_str(),
                escape(&record.app_name),
                escape(&record.message),
                escape(record.metadata.as_deref().unwrap_or("")),
                escape(record.trace_id().unwrap_or("")),
                escape(record.span_id().unwrap_or("")),
                escape(&record.host),
                escape(&record.environment),
            );
        }
        sql
    }
}

#[async_trait]
impl Sink for ClickHouseSink {
    fn name(&self) -> &str {
        "clickhouse"
    }

    async fn deliver(&self, batch: &Batch) -> Result<usize, SinkError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let statement = self.insert_statement(batch.records());
        debug!(
            batch = batch.index(),
            bytes = statement.len(),
            "sending insert to {}",
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("user", self.config.user.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .body(statement)
            .send()
            .await
            .map_err(|e| SinkError::from_request(e, self.config.timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                sink: "clickhouse",
                status: status.as_u16(),
                body,
            });
        }

        Ok(batch.len())
    }
}

/// Escapes a value for a single-quoted ClickHouse string literal.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\0' => {}
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
