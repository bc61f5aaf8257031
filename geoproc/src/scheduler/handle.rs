//! Execution handle for status queries, bounded waits, and cancellation.

use super::job::{ExecutionId, ResponseBody};
use crate::error::ServiceException;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

/// Lifecycle state of one execution.
///
/// Transitions are monotonic: `Accepted → Running → {Succeeded | Failed}`.
/// Later states never regress to earlier ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Admitted to the queue; visible to status polls immediately.
    #[default]
    Accepted,
    /// The worker is executing the algorithm.
    Running,
    /// Terminal: the response document is available.
    Succeeded,
    /// Terminal: a failure was captured as the job's result.
    Failed,
}

impl ExecutionStatus {
    /// True for `Succeeded` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "Accepted"),
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Terminal result of one execution.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// The finished response body (document or raw bytes).
    Succeeded(ResponseBody),
    /// The captured failure.
    Failed(Arc<ServiceException>),
}

/// What a bounded wait produced.
#[derive(Debug, Clone)]
pub enum WaitOutcome {
    /// The job reached a terminal state within the timeout.
    Completed(ExecutionOutcome),
    /// The caller's wait elapsed; the job keeps running.
    TimedOut,
}

/// Handle to a submitted execution.
///
/// Cloneable; all clones refer to the same execution. Timeouts expire
/// only the caller's wait, never the job itself — cancellation is an
/// explicit [`ExecutionHandle::cancel`].
#[derive(Clone)]
pub struct ExecutionHandle {
    execution_id: ExecutionId,
    status_rx: watch::Receiver<ExecutionStatus>,
    cancellation: CancellationToken,
    /// Set by the worker before the terminal status is published.
    outcome: Arc<Mutex<Option<ExecutionOutcome>>>,
}

impl ExecutionHandle {
    pub(super) fn new(
        execution_id: ExecutionId,
        status_rx: watch::Receiver<ExecutionStatus>,
        cancellation: CancellationToken,
        outcome: Arc<Mutex<Option<ExecutionOutcome>>>,
    ) -> Self {
        Self {
            execution_id,
            status_rx,
            cancellation,
            outcome,
        }
    }

    pub fn id(&self) -> &ExecutionId {
        &self.execution_id
    }

    /// Most recent status; non-blocking.
    pub fn status(&self) -> ExecutionStatus {
        *self.status_rx.borrow()
    }

    /// Waits until the job reaches a terminal state or the timeout
    /// elapses, whichever comes first. A timeout leaves the job running.
    pub async fn wait(&mut self, timeout: Duration) -> WaitOutcome {
        match tokio::time::timeout(timeout, self.wait_terminal()).await {
            Ok(outcome) => WaitOutcome::Completed(outcome),
            Err(_) => WaitOutcome::TimedOut,
        }
    }

    async fn wait_terminal(&mut self) -> ExecutionOutcome {
        loop {
            if self.status().is_terminal() {
                break;
            }
            if self.status_rx.changed().await.is_err() {
                // Scheduler dropped without publishing a terminal state.
                return ExecutionOutcome::Failed(Arc::new(ServiceException::no_applicable_code(
                    "scheduler shut down before the execution completed",
                )));
            }
        }

        let outcome = self.outcome.lock().await.clone();
        outcome.unwrap_or_else(|| {
            ExecutionOutcome::Failed(Arc::new(ServiceException::no_applicable_code(
                "execution finished without an outcome",
            )))
        })
    }

    /// Interrupts the worker if the job is still running. The job ends
    /// `Failed` with a computation-interrupted error, observed
    /// immediately by callers blocked in [`ExecutionHandle::wait`].
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }
}

impl std::fmt::Debug for ExecutionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("execution_id", &self.execution_id)
            .field("status", &self.status())
            .finish()
    }
}
