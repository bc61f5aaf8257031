//! The bounded worker pool and its submission surface.

use super::handle::{ExecutionHandle, ExecutionOutcome, ExecutionStatus};
use super::job::{ExecutionId, ExecutionWork, ResponseBody};
use crate::error::ServiceException;
use crate::store::ResultStore;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default number of concurrent workers.
pub const DEFAULT_WORKER_COUNT: usize = 8;

/// Default queue capacity for admitted-but-not-running executions.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Scheduler sizing.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Fixed worker concurrency `N`.
    pub worker_count: usize,
    /// Bounded queue capacity `Q`; a full queue rejects with `ServerBusy`.
    pub queue_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Renders status documents the scheduler persists on a job's behalf.
///
/// Implemented by the protocol layer; injected here so the pool can
/// persist terminal failure documents without depending on response
/// serialization.
pub trait StatusRenderer: Send + Sync {
    /// The terminal failure document for an execution.
    fn failed(&self, execution_id: &ExecutionId, error: &ServiceException) -> ResponseBody;
}

/// One admitted execution waiting for a worker.
struct QueuedExecution {
    execution_id: ExecutionId,
    work: ExecutionWork,
    status_tx: watch::Sender<ExecutionStatus>,
    cancellation: CancellationToken,
    outcome: Arc<Mutex<Option<ExecutionOutcome>>>,
}

/// Handle for submitting executions to the scheduler.
///
/// Cloneable and shared across request handlers.
#[derive(Clone)]
pub struct ExecutionSubmitter {
    queue_tx: mpsc::Sender<QueuedExecution>,
}

impl ExecutionSubmitter {
    /// Admits an execution under the given id.
    ///
    /// Never blocks: a full queue fails immediately with `ServerBusy`.
    /// The returned handle starts in `Accepted`, so a concurrent status
    /// poll sees the job before it runs.
    pub fn submit(
        &self,
        execution_id: ExecutionId,
        work: ExecutionWork,
    ) -> Result<ExecutionHandle, ServiceException> {
        let (status_tx, status_rx) = watch::channel(ExecutionStatus::Accepted);
        let cancellation = CancellationToken::new();
        let outcome = Arc::new(Mutex::new(None));

        let handle = ExecutionHandle::new(
            execution_id.clone(),
            status_rx,
            cancellation.clone(),
            Arc::clone(&outcome),
        );

        let queued = QueuedExecution {
            execution_id: execution_id.clone(),
            work,
            status_tx,
            cancellation,
            outcome,
        };

        match self.queue_tx.try_send(queued) {
            Ok(()) => {
                debug!(execution_id = %execution_id, "Execution admitted");
                Ok(handle)
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(execution_id = %execution_id, "Execution queue full, rejecting");
                Err(ServiceException::ServerBusy {
                    message: "the execution queue is at capacity, retry later".to_string(),
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ServiceException::no_applicable_code(
                "the execution scheduler is not running",
            )),
        }
    }
}

/// The worker pool engine.
///
/// Holds the queue receiver and a semaphore of `worker_count` permits.
/// The run loop acquires a permit, pops the next queued execution, and
/// spawns a worker; the permit travels with the worker and is released
/// when the job reaches its terminal state. Jobs may therefore finish
/// out of submission order, but each job's own state transitions stay
/// linearizable.
pub struct ExecutionScheduler {
    queue_rx: mpsc::Receiver<QueuedExecution>,
    permits: Arc<Semaphore>,
    store: Arc<dyn ResultStore>,
    renderer: Arc<dyn StatusRenderer>,
    config: SchedulerConfig,
}

impl ExecutionScheduler {
    /// Creates the scheduler and its submission handle.
    pub fn new(
        config: SchedulerConfig,
        store: Arc<dyn ResultStore>,
        renderer: Arc<dyn StatusRenderer>,
    ) -> (Self, ExecutionSubmitter) {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity.max(1));
        let scheduler = Self {
            queue_rx,
            permits: Arc::new(Semaphore::new(config.worker_count.max(1))),
            store,
            renderer,
            config,
        };
        (scheduler, ExecutionSubmitter { queue_tx })
    }

    /// Runs the scheduler until shutdown is signalled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            workers = self.config.worker_count,
            queue_capacity = self.config.queue_capacity,
            "Execution scheduler started"
        );

        loop {
            // A permit first, then a job: queued work never waits on an
            // already-saturated pool longer than it has to, and the
            // channel keeps its full capacity for admission control.
            let permit = tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                permit = Arc::clone(&self.permits).acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => break,
                },
            };

            let queued = tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                maybe = self.queue_rx.recv() => match maybe {
                    Some(q) => q,
                    None => break,
                },
            };

            self.spawn_worker(queued, permit);
        }

        info!("Execution scheduler shutting down");
    }

    fn spawn_worker(
        &self,
        queued: QueuedExecution,
        permit: tokio::sync::OwnedSemaphorePermit,
    ) {
        let store = Arc::clone(&self.store);
        let renderer = Arc::clone(&self.renderer);

        tokio::spawn(async move {
            let _permit = permit;
            let QueuedExecution {
                execution_id,
                work,
                status_tx,
                cancellation,
                outcome,
            } = queued;

            let _ = status_tx.send(ExecutionStatus::Running);
            info!(execution_id = %execution_id, "Execution started");
            let started = std::time::Instant::now();

            let work_future = work(cancellation.clone());
            let result = tokio::select! {
                _ = cancellation.cancelled() => Err(ServiceException::RemoteComputationError {
                    message: "computation interrupted by cancellation".to_string(),
                    source: None,
                }),
                r = work_future => r,
            };

            // Persist the terminal status document before publishing the
            // terminal state, so a poll that observes the state always
            // finds the document.
            let (terminal_status, terminal_outcome) = match result {
                Ok(body) => {
                    if let Err(e) = store.store(execution_id.as_str(), &body.bytes, &body.content_type) {
                        error!(execution_id = %execution_id, error = %e, "Failed to persist result document");
                    }
                    info!(
                        execution_id = %execution_id,
                        duration_ms = started.elapsed().as_millis(),
                        bytes = body.bytes.len(),
                        "Execution succeeded"
                    );
                    (ExecutionStatus::Succeeded, ExecutionOutcome::Succeeded(body))
                }
                Err(exception) => {
                    let body = renderer.failed(&execution_id, &exception);
                    if let Err(e) = store.store(execution_id.as_str(), &body.bytes, &body.content_type) {
                        error!(execution_id = %execution_id, error = %e, "Failed to persist failure document");
                    }
                    error!(
                        execution_id = %execution_id,
                        duration_ms = started.elapsed().as_millis(),
                        code = exception.code(),
                        error = %exception,
                        "Execution failed"
                    );
                    (ExecutionStatus::Failed, ExecutionOutcome::Failed(Arc::new(exception)))
                }
            };

            {
                let mut holder = outcome.lock().await;
                *holder = Some(terminal_outcome);
            }
            let _ = status_tx.send(terminal_status);
        });
    }
}

impl std::fmt::Debug for ExecutionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionScheduler")
            .field("config", &self.config)
            .finish()
    }
}
