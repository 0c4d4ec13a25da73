//! # logforge
//!
//! Synthesizes structured log records and streams them, in bounded
//! concurrent batches, into ClickHouse or a REST ingestion API.
//!
//! ## Features
//!
//! - **Batch planning** that splits a total into exact, ordered batches
//! - **Reproducible generation** with an optional seed
//! - **Backpressure** via a bounded worker pool
//! - **Graceful cancellation** that lets in-flight batches finish
//! - **Progress reporting** with rate and ETA
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use logforge::record::SyntheticFactory;
//! use logforge::runner::{RunConfigBuilder, Runner};
//! use logforge::sink::{ClickHouseConfig, ClickHouseSink};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = RunConfigBuilder::default()
//!     .total(1_000_000u64)
//!     .batch_size(10_000usize)
//!     .workers(4usize)
//!     .build()?;
//!
//! let sink = ClickHouseSink::new(ClickHouseConfig::default())?;
//! let runner = Runner::new(config, Arc::new(SyntheticFactory::new()), Arc::new(sink));
//! let summary = runner.run(&CancellationToken::new()).await?;
//! println!("{}", summary);
//! ```
//!
//! ## Modules
//!
//! - [`record`] - Log record model and record factories
//! - [`batch`] - Batch planning and generation
//! - [`sink`] - Batch destinations
//! - [`dispatch`] - Bounded worker pool and shared run counters
//! - [`progress`] - Periodic rate and ETA reporting
//! - [`runner`] - Run orchestration
//! - [`size`] - Size parsing and record size estimation

pub mod batch;
pub mod dispatch;
pub mod progress;
pub mod record;
pub mod runner;
pub mod sink;
pub mod size;
