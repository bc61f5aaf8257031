//! The processing service facade and its builder.

use super::error::ServiceError;
use crate::config::ConfigFile;
use crate::encoder::{GeneratorRegistry, OutputEncoder};
use crate::process::{Algorithm, ProcessDescriptor, ProcessRegistry};
use crate::protocol::{
    DispatchOutcome, DispatcherConfig, RawRequest, RequestDispatcher, XmlStatusRenderer,
};
use crate::resolver::{DefaultReferenceStrategy, ReferenceResolver, ReqwestClient};
use crate::scheduler::{ExecutionScheduler, SchedulerConfig};
use crate::store::{open_store, StorageSettingsHandle, WipingDaemon};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Builder for [`ProcessingService`].
///
/// Collects the process registrations and optional component overrides,
/// then wires everything and starts the background daemons.
pub struct ServiceBuilder {
    config: ConfigFile,
    registry: ProcessRegistry,
    generators: GeneratorRegistry,
    resolver: Option<ReferenceResolver>,
}

impl ServiceBuilder {
    /// Registers a process.
    pub fn register(mut self, descriptor: ProcessDescriptor, algorithm: Arc<dyn Algorithm>) -> Self {
        self.registry.register(descriptor, algorithm);
        self
    }

    /// Adds a generator beyond the builtins.
    pub fn with_generator(mut self, generator: Box<dyn crate::encoder::Generator>) -> Self {
        self.generators.register(generator);
        self
    }

    /// Replaces the default resolver chain, e.g. to prepend a custom
    /// strategy or inject a mock client in tests.
    pub fn with_resolver(mut self, resolver: ReferenceResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Wires the service and spawns its daemons.
    ///
    /// Must be called from within a Tokio runtime: the scheduler run
    /// loop and the wiping daemon are spawned here.
    pub fn build(self) -> Result<ProcessingService, ServiceError> {
        let storage_settings = StorageSettingsHandle::new(self.config.storage.clone())?;
        let store = open_store(&storage_settings.current())?;
        let shutdown = CancellationToken::new();

        let (scheduler, submitter) = ExecutionScheduler::new(
            SchedulerConfig {
                worker_count: self.config.execution.worker_count,
                queue_capacity: self.config.execution.queue_capacity,
            },
            Arc::clone(&store),
            Arc::new(XmlStatusRenderer),
        );
        tokio::spawn(scheduler.run(shutdown.clone()));

        let wiping = WipingDaemon::new(Arc::clone(&store), Arc::clone(&storage_settings));
        tokio::spawn(wiping.run(shutdown.clone()));

        let resolver = match self.resolver {
            Some(resolver) => resolver,
            None => {
                let client = ReqwestClient::new(self.config.resolver.timeout)?;
                let mut resolver = ReferenceResolver::new();
                resolver.register(Box::new(DefaultReferenceStrategy::new(
                    client,
                    self.config.resolver.max_body_bytes,
                )));
                resolver
            }
        };

        let encoder = Arc::new(OutputEncoder::new(
            self.generators,
            Arc::clone(&store),
            self.config.server.host.clone(),
            self.config.server.port,
        ));

        let dispatcher = RequestDispatcher::new(
            Arc::new(self.registry),
            submitter,
            Arc::new(resolver),
            encoder,
            store,
            DispatcherConfig {
                service_title: self.config.server.title.clone(),
                sync_timeout: self.config.execution.sync_timeout,
            },
        );

        info!(
            host = %self.config.server.host,
            port = self.config.server.port,
            "Processing service assembled"
        );

        Ok(ProcessingService {
            dispatcher: Arc::new(dispatcher),
            storage_settings,
            shutdown,
        })
    }
}

/// The assembled processing service.
///
/// Cheap to clone-by-Arc through [`ProcessingService::dispatcher`];
/// shutting down cancels the scheduler and wiping daemons.
pub struct ProcessingService {
    dispatcher: Arc<RequestDispatcher>,
    storage_settings: Arc<StorageSettingsHandle>,
    shutdown: CancellationToken,
}

impl ProcessingService {
    /// Starts a builder over the given configuration.
    pub fn builder(config: ConfigFile) -> ServiceBuilder {
        ServiceBuilder {
            config,
            registry: ProcessRegistry::new(),
            generators: GeneratorRegistry::with_builtins(),
            resolver: None,
        }
    }

    /// Drives one raw request to a response.
    pub async fn dispatch(&self, raw: RawRequest) -> DispatchOutcome {
        self.dispatcher.dispatch(raw).await
    }

    /// Shared dispatcher handle for transport bindings.
    pub fn dispatcher(&self) -> Arc<RequestDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Live storage settings; committed changes apply without restart.
    pub fn storage_settings(&self) -> Arc<StorageSettingsHandle> {
        Arc::clone(&self.storage_settings)
    }

    /// Stops the background daemons.
    pub fn shutdown(&self) {
        info!("Processing service shutting down");
        self.shutdown.cancel();
    }
}

impl Drop for ProcessingService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
