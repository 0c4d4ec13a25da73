use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Text form used for record timestamps on the wire.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Capitalized form, as stored in the `level` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Fatal => "Fatal",
        }
    }

    /// Lowercase form accepted by the ingestion API.
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GenerationError::Other(format!("unknown log level '{}'", s)))
    }
}

/// Errors raised while producing a single record.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A span was attached without a trace to belong to.
    #[error("trace id must not be empty")]
    EmptyTraceId,

    #[error("metadata serialization failed: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Distributed tracing identifiers carried by a record.
///
/// A span id can only exist next to a non-empty trace id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
    span_id: Option<String>,
}

impl TraceContext {
    pub fn new(
        trace_id: impl Into<String>,
        span_id: Option<String>,
    ) -> Result<Self, GenerationError> {
        let trace_id = trace_id.into();
        if trace_id.is_empty() {
            return Err(GenerationError::EmptyTraceId);
        }
        Ok(Self { trace_id, span_id })
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_deref()
    }
}

/// One synthesized log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub app_name: String,
    pub message: String,
    /// Serialized JSON object, if the record carries any metadata.
    pub metadata: Option<String>,
    pub trace: Option<TraceContext>,
    pub host: String,
    pub environment: String,
}

impl LogRecord {
    pub fn trace_id(&self) -> Option<&str> {
        self.trace.as_ref().map(TraceContext::trace_id)
    }

    pub fn span_id(&self) -> Option<&str> {
        self.trace.as_ref().and_then(TraceContext::span_id)
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

// Flat row shape, one key per column.
#[derive(Serialize)]
struct RecordRow<'a> {
    id: &'a str,
    timestamp: String,
    level: LogLevel,
    app_name: &'a str,
    message: &'a str,
    metadata: Option<&'a str>,
    trace_id: Option<&'a str>,
    span_id: Option<&'a str>,
    host: &'a str,
    environment: &'a str,
}

impl Serialize for LogRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        RecordRow {
            id: &self.id,
            timestamp: self.formatted_timestamp(),
            level: self.level,
            app_name: &self.app_name,
            message: &self.message,
            metadata: self.metadata.as_deref(),
            trace_id: self.trace_id(),
            span_id: self.span_id(),
            host: &self.host,
            environment: &self.environment,
        }
        .serialize(serializer)
    }
}
