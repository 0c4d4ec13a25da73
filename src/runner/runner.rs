use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::config::RunConfig;
use super::types::{RunError, RunPhase, RunSummary};
use crate::batch::{BatchDescriptor, BatchError, BatchGenerator, BatchPlanner, TimeWindow};
use crate::dispatch::{DispatchPool, RunState};
use crate::progress::ProgressTracker;
use crate::record::RecordFactory;
use crate::sink::Sink;

/// Drives one run: plan, generate, dispatch, drain, summarize.
///
/// Batch failures are counted and the run carries on; only invalid
/// configuration stops it before it starts.
pub struct Runner {
    config: RunConfig,
    factory: Arc<dyn RecordFactory>,
    sink: Arc<dyn Sink>,
}

impl Runner {
    pub fn new(config: RunConfig, factory: Arc<dyn RecordFactory>, sink: Arc<dyn Sink>) -> Self {
        Runner {
            config,
            factory,
            sink,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs to completion, or until `cancel` fires.
    ///
    /// On cancellation no further batch is submitted, batches already handed
    /// to the pool still complete, and the summary is marked as cancelled.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunSummary, RunError> {
        self.enter(RunPhase::Planning);
        self.config.validate()?;
        let planner = BatchPlanner::new(self.config.total, self.config.batch_size)?;
        let generator = Arc::new(self.generator()?);

        let state = Arc::new(RunState::new());
        let pool = DispatchPool::start(&self.config.pool_config(), self.sink.clone(), state.clone())?;

        let done = CancellationToken::new();
        let tracker = ProgressTracker::new(state.clone(), planner.total(), self.config.progress_interval);
        let progress = tokio::spawn(tracker.report(done.clone()));

        info!(
            total = planner.total(),
            batches = planner.len(),
            batch_size = planner.batch_size(),
            workers = self.config.workers,
            sink = self.sink.name(),
            "starting run"
        );

        self.enter(RunPhase::Dispatching);
        let mut cancelled = false;
        let mut dispatch_error = None;

        for descriptor in planner.iter() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let Some(batch) = Self::generate(&generator, descriptor, &state).await else {
                continue;
            };
            state.record_generated(batch.len() as u64);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                result = pool.submit(batch) => {
                    if let Err(e) = result {
                        error!("stopping dispatch: {}", e);
                        dispatch_error = Some(e);
                        break;
                    }
                }
            }
        }

        if cancelled {
            warn!("run cancelled, waiting for in-flight batches");
        }

        self.enter(RunPhase::Draining);
        let drained = pool.drain().await;

        done.cancel();
        if let Err(e) = progress.await {
            warn!("progress reporter stopped abnormally: {}", e);
        }

        self.enter(RunPhase::Completed);
        let summary = RunSummary {
            total: planner.total(),
            generated: state.generated(),
            inserted: state.inserted(),
            failed: state.failed(),
            batches: planner.len(),
            elapsed: state.elapsed(),
            cancelled,
        };
        info!("{}", summary);

        if let Some(e) = dispatch_error {
            return Err(e.into());
        }
        drained?;
        Ok(summary)
    }

    fn generator(&self) -> Result<BatchGenerator, BatchError> {
        let window = match self.config.window {
            Some(window) => window,
            None => TimeWindow::last_days(self.config.days, Utc::now())?,
        };
        let generator = BatchGenerator::new(window, self.factory.clone());
        Ok(match self.config.seed {
            Some(seed) => generator.with_seed(seed),
            None => generator,
        })
    }

    // Generation is CPU-bound, so it runs on the blocking pool while the
    // workers keep delivering earlier batches.
    async fn generate(
        generator: &Arc<BatchGenerator>,
        descriptor: BatchDescriptor,
        state: &RunState,
    ) -> Option<crate::batch::Batch> {
        let generator = Arc::clone(generator);
        let result = tokio::task::spawn_blocking(move || generator.generate(descriptor)).await;

        match result {
            Ok(Ok(batch)) => Some(batch),
            Ok(Err(BatchError::Generation { index, source })) => {
                state.record_failed(descriptor.size as u64);
                warn!(
                    batch = index,
                    records = descriptor.size,
                    "discarding batch, record generation failed: {}",
                    source
                );
                None
            }
            Ok(Err(e)) => {
                state.record_failed(descriptor.size as u64);
                warn!(batch = descriptor.index, "discarding batch: {}", e);
                None
            }
            Err(e) => {
                state.record_failed(descriptor.size as u64);
                error!(batch = descriptor.index, "generation task failed: {}", e);
                None
            }
        }
    }

    fn enter(&self, phase: RunPhase) {
        info!(%phase, "run phase");
    }
}
