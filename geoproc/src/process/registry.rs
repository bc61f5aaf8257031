//! Algorithm trait and the explicit registration table.

use super::context::ExecutionContext;
use super::data::ProcessData;
use super::descriptor::ProcessDescriptor;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Outputs produced by one algorithm run, keyed by output identifier.
pub type ProcessOutputs = HashMap<String, ProcessData>;

/// A domain failure raised by an algorithm.
///
/// These become the job's terminal `Failed` state; they never crash the
/// worker pool.
#[derive(Debug, Error)]
pub enum AlgorithmError {
    /// The computation itself failed.
    #[error("{0}")]
    Domain(String),

    /// An input could not be used by the algorithm.
    #[error("invalid input {input}: {reason}")]
    InvalidInput { input: String, reason: String },

    /// The run was interrupted by cancellation.
    #[error("computation interrupted")]
    Interrupted,

    /// Unexpected internal failure, cause attached.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// One registered computational unit.
///
/// Implementations must be cheap to share (`Arc`) and must poll the
/// context's cancellation token at natural suspension points.
pub trait Algorithm: Send + Sync {
    fn run<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutputs, AlgorithmError>> + Send + 'a>>;
}

/// Explicit process registration table: identifier → (descriptor,
/// algorithm). Iteration preserves registration order, which keeps
/// capabilities listings stable.
#[derive(Default)]
pub struct ProcessRegistry {
    entries: Vec<(ProcessDescriptor, Arc<dyn Algorithm>)>,
    by_id: HashMap<String, usize>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a process. A second registration under the same
    /// identifier replaces the first.
    pub fn register(&mut self, descriptor: ProcessDescriptor, algorithm: Arc<dyn Algorithm>) {
        let identifier = descriptor.identifier.clone();
        if let Some(&idx) = self.by_id.get(&identifier) {
            self.entries[idx] = (descriptor, algorithm);
        } else {
            self.by_id.insert(identifier.clone(), self.entries.len());
            self.entries.push((descriptor, algorithm));
        }
        info!(process = %identifier, "Process registered");
    }

    pub fn descriptor(&self, identifier: &str) -> Option<&ProcessDescriptor> {
        self.by_id.get(identifier).map(|&idx| &self.entries[idx].0)
    }

    pub fn algorithm(&self, identifier: &str) -> Option<Arc<dyn Algorithm>> {
        self.by_id
            .get(identifier)
            .map(|&idx| Arc::clone(&self.entries[idx].1))
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ProcessDescriptor> {
        self.entries.iter().map(|(d, _)| d)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
