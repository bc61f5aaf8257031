//! The strategy chain.

use super::types::{InputReference, ReferenceInputStream};
use crate::error::ServiceException;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

/// One way of dereferencing an input reference.
pub trait ReferenceStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Whether this strategy can handle the given reference.
    fn is_applicable(&self, reference: &InputReference) -> bool;

    /// Fetches the referenced payload.
    fn resolve<'a>(
        &'a self,
        reference: &'a InputReference,
    ) -> Pin<Box<dyn Future<Output = Result<ReferenceInputStream, ServiceException>> + Send + 'a>>;
}

/// Ordered strategy list; later registrations take priority.
///
/// Constructed once at startup and shared by reference; registration
/// order is therefore fixed before the first request arrives.
pub struct ReferenceResolver {
    strategies: Vec<Box<dyn ReferenceStrategy>>,
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Registers a strategy. The most recently registered strategy is
    /// consulted first.
    pub fn register(&mut self, strategy: Box<dyn ReferenceStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Resolves a reference through the first applicable strategy.
    ///
    /// Fails with `NoApplicableCode` when no strategy accepts the
    /// reference.
    pub async fn resolve(
        &self,
        reference: &InputReference,
    ) -> Result<ReferenceInputStream, ServiceException> {
        for strategy in self.strategies.iter().rev() {
            if strategy.is_applicable(reference) {
                debug!(
                    strategy = strategy.name(),
                    href = %reference.href,
                    "Resolving input reference"
                );
                return strategy.resolve(reference).await;
            }
        }

        Err(ServiceException::no_applicable_code(format!(
            "no reference strategy applicable to {}",
            reference.href
        )))
    }
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}
