pub mod config;
pub mod runner;
pub mod types;

pub use config::{RunConfig, RunConfigBuilder};
pub use runner::Runner;
pub use types::{FailurePolicy, RunError, RunPhase, RunSummary};
