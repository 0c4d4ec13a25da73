// src/sink/api.rs

use std::time::Duration;

use async_trait::async_trait;
use derive_builder::Builder;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::Sink;
use super::types::SinkError;
use crate::batch::Batch;
use crate::record::LogRecord;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ApiConfig {
    /// Base URL of the ingestion service
    #[builder(default = "\"http://localhost:5000\".to_string()")]
    pub(crate) api_url: String,

    #[builder(default = "\"change-me-in-production\".to_string()")]
    pub(crate) api_key: String,

    /// Timeout for one batch request
    #[builder(default = "Duration::from_secs(60)")]
    pub(crate) timeout: Duration,
}

impl ApiConfig {
    #[inline]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            api_url: "http://localhost:5000".to_string(),
            api_key: "change-me-in-production".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Serialize)]
struct BatchPayload<'a> {
    logs: Vec<ApiLog<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiLog<'a> {
    level: &'static str,
    message: &'a str,
    app_name: &'a str,
    metadata: Option<Value>,
    trace_id: Option<&'a str>,
    span_id: Option<&'a str>,
    host: &'a str,
    environment: &'a str,
}

impl<'a> ApiLog<'a> {
    fn from_record(record: &'a LogRecord) -> Result<Self, SinkError> {
        let metadata = record
            .metadata
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()?;

        Ok(ApiLog {
            level: record.level.as_lowercase(),
            message: &record.message,
            app_name: &record.app_name,
            metadata,
            trace_id: record.trace_id(),
            span_id: record.span_id(),
            host: &record.host,
            environment: &record.environment,
        })
    }
}

/// Posts each batch as one JSON document to the ingestion API.
pub struct ApiSink {
    config: ApiConfig,
    client: reqwest::Client,
    endpoint: String,
}

impl ApiSink {
    pub fn new(config: ApiConfig) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SinkError::Transport)?;
        let endpoint = format!("{}/api/logs/batch", config.api_url.trim_end_matches('/'));

        Ok(Self {
            config,
            client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Serializes `records` into the `{"logs": [...]}` request body.
    pub fn encode(&self, records: &[LogRecord]) -> Result<Vec<u8>, SinkError> {
        let logs = records
            .iter()
            .map(ApiLog::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(serde_json::to_vec(&BatchPayload { logs })?)
    }
}

#[async_trait]
impl Sink for ApiSink {
    fn name(&self) -> &str {
        "api"
    }

    async fn deliver(&self, batch: &Batch) -> Result<usize, SinkError> {
        let body = self.encode(batch.records())?;
        debug!(
            batch = batch.index(),
            bytes = body.len(),
            "posting batch to {}",
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| SinkError::from_request(e, self.config.timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                sink: "api",
                status: status.as_u16(),
                body,
            });
        }

        Ok(batch.len())
    }
}
