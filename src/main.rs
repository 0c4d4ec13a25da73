//! logforge - synthetic log load generator
//!
//! Usage:
//!   # One million records straight into ClickHouse
//!   logforge --count 1000000
//!
//!   # Roughly 5 GB through the ingestion API
//!   logforge --size 5GB --mode api --api-url http://localhost:5000 --api-key secret
//!
//!   # Reproducible content, bigger batches, more workers
//!   logforge --count 500000 --batch 50000 --workers 8 --seed 42

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgGroup, Parser, ValueEnum};
use logforge::record::SyntheticFactory;
use logforge::runner::{FailurePolicy, RunConfigBuilder, RunError, Runner};
use logforge::sink::{ApiConfigBuilder, ApiSink, ClickHouseConfigBuilder, ClickHouseSink, Sink};
use logforge::size::{self, HumanBytes, Volume};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SIZE_SAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Bulk INSERT over the ClickHouse HTTP interface
    Clickhouse,
    /// Batch POST to the log ingestion API
    Api,
}

#[derive(Debug, Parser)]
#[command(name = "logforge", version, about = "Generate synthetic logs and load them into ClickHouse or the ingestion API")]
#[command(group(ArgGroup::new("volume").required(true).args(["count", "size"])))]
struct Cli {
    /// Number of log records to generate
    #[arg(long, env = "LOGFORGE_COUNT")]
    count: Option<u64>,

    /// Target data size, e.g. 1GB or 500MB
    #[arg(long, env = "LOGFORGE_SIZE", value_parser = size::parse_size)]
    size: Option<u64>,

    /// Records per batch
    #[arg(long = "batch", env = "LOGFORGE_BATCH", default_value_t = 10_000)]
    batch_size: usize,

    /// Concurrent deliveries
    #[arg(long, env = "LOGFORGE_WORKERS", default_value_t = 4)]
    workers: usize,

    /// Generated batches allowed to wait for a free worker
    #[arg(long, env = "LOGFORGE_QUEUE_DEPTH", default_value_t = 1)]
    queue_depth: usize,

    #[arg(long, env = "LOGFORGE_MODE", value_enum, default_value_t = Mode::Clickhouse)]
    mode: Mode,

    /// ClickHouse host
    #[arg(long, env = "LOGFORGE_HOST", default_value = "localhost")]
    host: String,

    /// ClickHouse HTTP port
    #[arg(long, env = "LOGFORGE_PORT", default_value_t = 8123)]
    port: u16,

    #[arg(long, env = "LOGFORGE_USER", default_value = "admin")]
    user: String,

    #[arg(long, env = "LOGFORGE_PASSWORD", default_value = "admin", hide_env_values = true)]
    password: String,

    #[arg(long, env = "LOGFORGE_DATABASE", default_value = "logfordev")]
    database: String,

    /// Ingestion API base URL
    #[arg(long, env = "LOGFORGE_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    #[arg(long, env = "LOGFORGE_API_KEY", default_value = "change-me-in-production", hide_env_values = true)]
    api_key: String,

    /// Spread timestamps over the last N days
    #[arg(long, env = "LOGFORGE_DAYS", default_value_t = 30)]
    days: u32,

    /// Seed for reproducible content
    #[arg(long, env = "LOGFORGE_SEED")]
    seed: Option<u64>,

    /// Progress report interval, e.g. 5s, 500ms or 10
    #[arg(long, env = "LOGFORGE_PROGRESS_INTERVAL", default_value = "5s", value_parser = parse_interval)]
    progress_interval: Duration,

    /// When a finished run exits with a failure code
    #[arg(long, env = "LOGFORGE_FAIL_ON", value_enum, default_value_t = FailurePolicy::AllFailed)]
    fail_on: FailurePolicy,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "LOGFORGE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn parse_interval(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    let parsed = if let Some(ms) = input.strip_suffix("ms") {
        ms.trim().parse::<u64>().map(Duration::from_millis)
    } else {
        let secs = input.strip_suffix('s').unwrap_or(input);
        secs.trim().parse::<u64>().map(Duration::from_secs)
    };
    parsed.map_err(|_| format!("invalid interval '{}'", input))
}

fn build_sink(cli: &Cli) -> Result<Arc<dyn Sink>, RunError> {
    let sink: Arc<dyn Sink> = match cli.mode {
        Mode::Clickhouse => {
            let config = ClickHouseConfigBuilder::default()
                .host(cli.host.clone())
                .port(cli.port)
                .user(cli.user.clone())
                .password(cli.password.clone())
                .database(cli.database.clone())
                .build()
                .map_err(|e| RunError::InvalidConfiguration(e.to_string()))?;
            Arc::new(ClickHouseSink::new(config)?)
        }
        Mode::Api => {
            let config = ApiConfigBuilder::default()
                .api_url(cli.api_url.clone())
                .api_key(cli.api_key.clone())
                .build()
                .map_err(|e| RunError::InvalidConfiguration(e.to_string()))?;
            Arc::new(ApiSink::new(config)?)
        }
    };
    Ok(sink)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let factory = Arc::new(SyntheticFactory::new());
    let average = size::estimate_record_size(factory.as_ref(), SIZE_SAMPLES, &mut rand::thread_rng())?;

    let volume = match (cli.count, cli.size) {
        (Some(count), _) => Volume::Count(count),
        (None, Some(bytes)) => Volume::Bytes(bytes),
        (None, None) => return Err("either --count or --size is required".into()),
    };
    let total = volume.resolve(average)?;
    if let Volume::Bytes(bytes) = volume {
        info!(
            target_size = %HumanBytes(bytes as f64),
            average_bytes = average.round(),
            "sizing run from target volume"
        );
    }

    let mut builder = RunConfigBuilder::default();
    builder
        .total(total)
        .batch_size(cli.batch_size)
        .workers(cli.workers)
        .queue_depth(cli.queue_depth)
        .days(cli.days)
        .progress_interval(cli.progress_interval)
        .failure_policy(cli.fail_on);
    if let Some(seed) = cli.seed {
        builder.seed(seed);
    }
    let config = builder.build()?;

    let sink = build_sink(&cli)?;
    info!(
        total,
        batch = cli.batch_size,
        workers = cli.workers,
        mode = ?cli.mode,
        days = cli.days,
        "generating logs"
    );

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("shutdown signal received, finishing in-flight batches");
            cancel_clone.cancel();
        }
    });

    let runner = Runner::new(config, factory, sink);
    let summary = runner.run(&cancel).await?;

    println!("{}", summary);
    println!(
        "Estimated data size: {}",
        HumanBytes(summary.inserted as f64 * average)
    );

    if summary.is_failure(runner.config().failure_policy()) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
