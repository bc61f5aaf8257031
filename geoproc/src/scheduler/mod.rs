//! Admission-controlled asynchronous execution.
//!
//! The scheduler owns a bounded worker pool: at most `N` executions run
//! concurrently and at most `Q` wait in the queue. Submission on a full
//! queue fails immediately with `ServerBusy` rather than blocking; this
//! is a hard backpressure boundary.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   ExecutionSubmitter                      │
//! │  try_send onto the bounded queue, hand back a handle     │
//! ├──────────────────────────────────────────────────────────┤
//! │                   ExecutionScheduler                      │
//! │  acquire permit → pop queue → spawn worker               │
//! ├──────────────────────────────────────────────────────────┤
//! │  worker: run job → persist terminal status → set outcome │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Two submission modes sit on top of one mechanism. A synchronous
//! caller blocks on [`ExecutionHandle::wait`] with a timeout: if the job
//! finishes first the full response comes back inline, otherwise the
//! caller gets an Accepted response while the job keeps running. A
//! fire-and-store caller never waits at all. Either way the worker
//! persists the job's terminal status document under the execution id,
//! so a later RetrieveResult always finds it.

mod handle;
mod job;
mod scheduler;

pub use handle::{ExecutionHandle, ExecutionOutcome, ExecutionStatus, WaitOutcome};
pub use job::{
    ExecuteJob, ExecutionId, ExecutionWork, OutputRequest, ResponseBody, ResponseForm,
};
pub use scheduler::{ExecutionScheduler, ExecutionSubmitter, SchedulerConfig, StatusRenderer};
