//! Default record factory producing realistic service logs.

use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng, RngCore};
use serde_json::{Map, Value};

use super::factory::{RecordFactory, stamp};
use super::types::{GenerationError, LogLevel, LogRecord, TraceContext};

const APP_NAMES: &[&str] = &[
    "auth-service",
    "api-gateway",
    "user-service",
    "payment-service",
    "notification-service",
    "order-service",
    "inventory-service",
    "search-service",
    "analytics-service",
    "email-service",
    "file-service",
    "cache-service",
    "queue-worker",
    "scheduler",
    "web-frontend",
    "mobile-backend",
    "admin-panel",
    "webhook-handler",
];

const ENVIRONMENTS: &[(&str, u32)] = &[
    ("production", 70),
    ("staging", 15),
    ("development", 10),
    ("testing", 5),
];

const LEVELS: &[(LogLevel, u32)] = &[
    (LogLevel::Trace, 5),
    (LogLevel::Debug, 15),
    (LogLevel::Info, 50),
    (LogLevel::Warning, 20),
    (LogLevel::Error, 8),
    (LogLevel::Fatal, 2),
];

const HOST_COUNT: u32 = 20;
const TRACE_PROBABILITY: f64 = 0.3;

const ERROR_MESSAGES: &[&str] = &[
    "Connection refused",
    "Timeout exceeded",
    "Invalid credentials",
    "Resource not found",
    "Permission denied",
    "Rate limit exceeded",
    "Internal server error",
    "Bad gateway",
    "Service unavailable",
    "Network unreachable",
    "SSL certificate error",
    "DNS resolution failed",
];

const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH"];

const PATHS: &[&str] = &[
    "/api/users",
    "/api/orders",
    "/api/products",
    "/api/auth/login",
    "/api/auth/logout",
    "/api/payments",
    "/api/notifications",
    "/api/files/upload",
    "/api/search",
    "/api/analytics",
    "/api/webhooks",
    "/api/settings",
    "/api/health",
    "/api/metrics",
];

fn templates(level: LogLevel) -> &'static [&'static str] {
    match level {
        LogLevel::Trace => &[
            "Entering method {method} with params: {params}",
            "Variable state: {var}={value}",
            "Cache lookup for key: {key}",
            "SQL query executed: {query}",
            "HTTP request details: {details}",
        ],
        LogLevel::Debug => &[
            "Processing request for user {user_id}",
            "Cache hit for key: {key}",
            "Database query returned {count} rows",
            "Request payload size: {size} bytes",
            "Response time: {time}ms",
            "Session validated for user {user_id}",
            "Loading configuration from {source}",
        ],
        LogLevel::Info => &[
            "User {user_id} logged in successfully",
            "Order {order_id} created for amount ${amount}",
            "Email sent to {email}",
            "File {filename} uploaded successfully ({size} bytes)",
            "Payment processed: {transaction_id}",
            "API request completed: {method} {path} - {status}",
            "Scheduled job {job_name} started",
            "User {user_id} updated profile",
            "New user registered: {email}",
            "Webhook delivered to {url}",
            "Background task {task_id} completed",
            "Cache refreshed for {cache_name}",
        ],
        LogLevel::Warning => &[
            "High memory usage detected: {usage}%",
            "Slow query detected ({time}ms): {query}",
            "Rate limit approaching for client {client_id}",
            "Deprecated API endpoint called: {endpoint}",
            "Connection pool running low: {available}/{total}",
            "Retry attempt {attempt} for operation {operation}",
            "Cache miss rate high: {rate}%",
            "Request timeout extended for {path}",
            "Disk space running low: {available}GB remaining",
        ],
        LogLevel::Error => &[
            "Failed to process payment: {error}",
            "Database connection failed: {error}",
            "API request failed: {method} {path} - {status}",
            "Authentication failed for user {user_id}",
            "File upload failed: {error}",
            "Email delivery failed to {email}: {error}",
            "Webhook delivery failed to {url}: {status}",
            "Cache operation failed: {error}",
            "External service unavailable: {service}",
            "Validation error: {field} - {error}",
        ],
        LogLevel::Fatal => &[
            "System out of memory - shutting down",
            "Database connection pool exhausted",
            "Critical configuration missing: {config}",
            "Unrecoverable error in {component}: {error}",
            "Service health check failed - restarting",
            "Disk full - cannot write to {path}",
        ],
    }
}

/// Record factory mimicking a fleet of microservices.
///
/// Level and environment follow fixed weights; 30% of records carry a
/// trace context, and metadata keys are attached independently.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFactory;

impl SyntheticFactory {
    pub fn new() -> Self {
        SyntheticFactory
    }

    fn message(&self, level: LogLevel, rng: &mut dyn RngCore) -> String {
        fill_template(pick(rng, templates(level)), rng)
    }

    fn metadata(
        &self,
        level: LogLevel,
        rng: &mut dyn RngCore,
    ) -> Result<Option<String>, GenerationError> {
        let mut metadata = Map::new();

        if rng.gen_bool(0.3) {
            metadata.insert("request_id".into(), Value::from(random_uuid(rng)));
        }
        if rng.gen_bool(0.2) {
            metadata.insert("user_id".into(), Value::from(rng.gen_range(1000..=999_999)));
        }
        if rng.gen_bool(0.1) {
            let duration = (rng.gen_range(1.0..5000.0_f64) * 100.0).round() / 100.0;
            metadata.insert("duration_ms".into(), Value::from(duration));
        }
        if matches!(level, LogLevel::Error | LogLevel::Fatal) && rng.gen_bool(0.5) {
            let frame = format!(
                "at Module.function (file.js:{}:{})\n",
                rng.gen_range(1..=500),
                rng.gen_range(1..=100)
            );
            let depth = rng.gen_range(3..=10);
            metadata.insert("stack_trace".into(), Value::from(frame.repeat(depth)));
        }
        if rng.gen_bool(0.15) {
            let ip = format!(
                "{}.{}.{}.{}",
                rng.gen_range(1..=255),
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
                rng.gen_range(1..=254)
            );
            metadata.insert("ip_address".into(), Value::from(ip));
        }

        if metadata.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string(&Value::Object(metadata))?))
    }

    fn trace(&self, rng: &mut dyn RngCore) -> Result<Option<TraceContext>, GenerationError> {
        if !rng.gen_bool(TRACE_PROBABILITY) {
            return Ok(None);
        }
        let trace_id = random_hex(rng, 32);
        let span_id = random_hex(rng, 16);
        TraceContext::new(trace_id, Some(span_id)).map(Some)
    }
}

impl RecordFactory for SyntheticFactory {
    fn create(
        &self,
        base: DateTime<Utc>,
        offset: TimeDelta,
        rng: &mut dyn RngCore,
    ) -> Result<LogRecord, GenerationError> {
        let level = weighted(rng, LEVELS);
        let timestamp = stamp(base, offset)?;

        Ok(LogRecord {
            id: random_uuid(rng),
            timestamp,
            level,
            app_name: pick(rng, APP_NAMES).to_string(),
            message: self.message(level, rng),
            metadata: self.metadata(level, rng)?,
            trace: self.trace(rng)?,
            host: format!("server-{:02}.prod.internal", rng.gen_range(1..=HOST_COUNT)),
            environment: weighted(rng, ENVIRONMENTS).to_string(),
        })
    }
}

fn pick<T: Copy>(rng: &mut dyn RngCore, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

fn weighted<T: Copy>(rng: &mut dyn RngCore, items: &[(T, u32)]) -> T {
    let total: u32 = items.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (item, weight) in items {
        if roll < *weight {
            return *item;
        }
        roll -= weight;
    }
    items[items.len() - 1].0
}

// Ids are drawn from the caller's RNG so seeded runs repeat exactly.
fn random_uuid(rng: &mut dyn RngCore) -> String {
    uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid().to_string()
}

fn random_hex(rng: &mut dyn RngCore, len: usize) -> String {
    let simple = uuid::Builder::from_random_bytes(rng.r#gen())
        .into_uuid()
        .simple()
        .to_string();
    simple[..len.min(simple.len())].to_string()
}

/// Replaces every `{name}` placeholder with a generated value.
///
/// Unknown placeholders are left untouched.
pub fn fill_template(template: &str, rng: &mut dyn RngCore) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match placeholder(name, rng) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn placeholder(name: &str, rng: &mut dyn RngCore) -> Option<String> {
    let value = match name {
        "method" => pick(rng, METHODS).to_string(),
        "path" | "endpoint" => pick(rng, PATHS).to_string(),
        "user_id" => rng.gen_range(1000..=999_999).to_string(),
        "order_id" => format!("ORD-{}", rng.gen_range(100_000..=999_999)),
        "transaction_id" => format!("TXN-{}", random_hex(rng, 12)),
        "email" => format!("user{}@example.com", rng.gen_range(1..=9999)),
        "filename" => format!(
            "file_{}.{}",
            rng.gen_range(1..=9999),
            pick(rng, &["pdf", "jpg", "png", "doc", "xlsx"])
        ),
        "amount" => format!("{:.2}", rng.gen_range(10.0..1000.0_f64)),
        "size" => rng.gen_range(100..=10_000_000).to_string(),
        "time" => rng.gen_range(1..=30_000).to_string(),
        "count" => rng.gen_range(0..=10_000).to_string(),
        "status" => pick(rng, &[200, 201, 400, 401, 403, 404, 500, 502, 503]).to_string(),
        "error" => pick(rng, ERROR_MESSAGES).to_string(),
        "key" => format!(
            "cache:{}:{}",
            pick(rng, &["user", "session", "data", "config"]),
            rng.gen_range(1..=9999)
        ),
        "usage" => rng.gen_range(70..=99).to_string(),
        "rate" => rng.gen_range(20..=80).to_string(),
        "available" => rng.gen_range(1..=100).to_string(),
        "total" => rng.gen_range(100..=500).to_string(),
        "attempt" => rng.gen_range(1..=5).to_string(),
        "operation" => pick(rng, &["db_write", "api_call", "file_upload", "email_send"]).to_string(),
        "client_id" => format!("client-{}", rng.gen_range(1..=100)),
        "query" => "SELECT * FROM users WHERE ...".to_string(),
        "job_name" => pick(rng, &["cleanup", "sync", "backup", "report", "notify"]).to_string(),
        "task_id" => random_uuid(rng)[..8].to_string(),
        "cache_name" => pick(rng, &["users", "products", "sessions", "configs"]).to_string(),
        "url" => format!("https://webhook.example.com/{}", rng.gen_range(1..=100)),
        "service" => pick(
            rng,
            &["payment-gateway", "email-provider", "sms-service", "cdn"],
        )
        .to_string(),
        "field" => pick(rng, &["email", "phone", "address", "amount"]).to_string(),
        "component" => pick(rng, &["database", "cache", "queue", "storage"]).to_string(),
        "config" => pick(rng, &["DATABASE_URL", "API_KEY", "SECRET_KEY"]).to_string(),
        "params" => serde_json::json!({ "id": rng.gen_range(1..=1000) }).to_string(),
        "var" => pick(rng, &["result", "counter", "state"]).to_string(),
        "value" => rng.gen_range(0..=100).to_string(),
        "details" => format!(
            "Headers: {}, Body: {} bytes",
            rng.gen_range(5..=20),
            rng.gen_range(0..=10_000)
        ),
        "source" => pick(rng, &["env", "file", "remote"]).to_string(),
        _ => return None,
    };
    Some(value)
}
