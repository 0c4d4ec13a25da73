use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::config::PoolConfig;
use super::state::RunState;
use super::types::DispatchError;
use crate::batch::Batch;
use crate::sink::Sink;

/// Fixed set of workers delivering batches to a sink.
///
/// Batches travel through a bounded channel, so [`submit`](Self::submit)
/// waits once every worker is busy and the queue is full. A failed delivery
/// is counted and logged; it never stops the other workers.
pub struct DispatchPool {
    config: PoolConfig,
    sender: mpsc::Sender<Batch>,
    handles: Vec<JoinHandle<()>>,
}

impl DispatchPool {
    pub fn start(
        config: &PoolConfig,
        sink: Arc<dyn Sink>,
        state: Arc<RunState>,
    ) -> Result<Self, DispatchError> {
        if config.workers == 0 {
            return Err(DispatchError::InvalidConfiguration(
                "worker count must be greater than zero".to_string(),
            ));
        }
        if config.queue_depth == 0 {
            return Err(DispatchError::InvalidConfiguration(
                "queue depth must be greater than zero".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::channel(config.queue_depth);
        let receiver = Arc::new(Mutex::new(receiver));
        let mut handles = Vec::with_capacity(config.workers);

        for worker_id in 0..config.workers {
            let receiver = receiver.clone();
            let sink = sink.clone();
            let state = state.clone();

            let handle = tokio::spawn(async move {
                Self::worker(worker_id, receiver, sink, state).await;
            });
            handles.push(handle);
        }

        Ok(Self {
            config: config.clone(),
            sender,
            handles,
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Hands a batch to the pool, waiting for room if the pool is saturated.
    pub async fn submit(&self, batch: Batch) -> Result<(), DispatchError> {
        self.sender
            .send(batch)
            .await
            .map_err(|_| DispatchError::ChannelClosed)
    }

    /// Closes the pool and waits until every submitted batch has completed.
    pub async fn drain(self) -> Result<(), DispatchError> {
        drop(self.sender);

        let mut panicked = 0;
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("dispatch worker terminated abnormally: {}", e);
                panicked += 1;
            }
        }

        if panicked > 0 {
            return Err(DispatchError::WorkerPanicked(panicked));
        }
        Ok(())
    }

    async fn worker(
        worker_id: usize,
        receiver: Arc<Mutex<mpsc::Receiver<Batch>>>,
        sink: Arc<dyn Sink>,
        state: Arc<RunState>,
    ) {
        loop {
            // Idle workers queue on the mutex, not on the channel; only the
            // holder awaits recv().
            // The lock is released before delivery starts.
            let batch = {
                let mut rx = receiver.lock().await;
                rx.recv().await
            };

            match batch {
                Some(batch) => Self::deliver(worker_id, sink.as_ref(), &state, batch).await,
                None => {
                    debug!("worker {} channel closed", worker_id);
                    return;
                }
            }
        }
    }

    async fn deliver(worker_id: usize, sink: &dyn Sink, state: &RunState, batch: Batch) {
        let size = batch.len() as u64;
        let outcome = AssertUnwindSafe(sink.deliver(&batch)).catch_unwind().await;
        match outcome {
            Ok(Ok(inserted)) => {
                state.record_inserted(inserted as u64);
                debug!(
                    worker = worker_id,
                    batch = batch.index(),
                    inserted,
                    "batch delivered"
                );
            }
            Ok(Err(e)) => {
                state.record_failed(size);
                warn!(
                    worker = worker_id,
                    batch = batch.index(),
                    records = size,
                    "{} delivery failed: {}",
                    sink.name(),
                    e
                );
            }
            Err(panic) => {
                state.record_failed(size);
                error!(
                    worker = worker_id,
                    batch = batch.index(),
                    records = size,
                    "{} panicked during delivery: {}",
                    sink.name(),
                    panic_message(panic.as_ref())
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}
