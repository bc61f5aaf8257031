//! Execution context handed to running algorithms.

use crate::process::data::ProcessData;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Everything an algorithm sees while running: its resolved inputs and a
/// cancellation token it is expected to poll at natural suspension
/// points.
pub struct ExecutionContext {
    inputs: HashMap<String, Vec<ProcessData>>,
    cancellation: CancellationToken,
}

impl ExecutionContext {
    pub fn new(
        inputs: HashMap<String, Vec<ProcessData>>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            inputs,
            cancellation,
        }
    }

    /// All values supplied for one input identifier.
    pub fn values(&self, identifier: &str) -> &[ProcessData] {
        self.inputs
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The single value supplied for one input identifier, if exactly
    /// one was given.
    pub fn value(&self, identifier: &str) -> Option<&ProcessData> {
        match self.values(identifier) {
            [single] => Some(single),
            _ => None,
        }
    }

    /// The string content of a single literal input.
    pub fn literal(&self, identifier: &str) -> Option<&str> {
        self.value(identifier)
            .and_then(|v| v.as_literal())
            .map(|l| l.value.as_str())
    }

    pub fn inputs(&self) -> &HashMap<String, Vec<ProcessData>> {
        &self.inputs
    }

    /// True once the execution has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves when the execution is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }
}
