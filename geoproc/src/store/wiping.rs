//! Background wiping daemon.
//!
//! Runs a periodic single-threaded sweep over the result store, deleting
//! artifacts older than the configured threshold. The daemon is
//! independent of request handling and never holds the worker pool; it
//! re-reads the storage settings on every cycle, so threshold and period
//! changes apply without a restart.

use super::settings::StorageSettingsHandle;
use super::types::ResultStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Periodic age-based artifact deletion.
pub struct WipingDaemon {
    store: Arc<dyn ResultStore>,
    settings: Arc<StorageSettingsHandle>,
}

impl WipingDaemon {
    pub fn new(store: Arc<dyn ResultStore>, settings: Arc<StorageSettingsHandle>) -> Self {
        Self { store, settings }
    }

    /// Runs one sweep if wiping is enabled. Returns how many artifacts
    /// were removed.
    pub fn sweep_once(&self) -> usize {
        let settings = self.settings.current();
        if !settings.wiping_enabled {
            debug!("Wiping disabled, skipping sweep");
            return 0;
        }

        match self.store.sweep(settings.wiping_threshold) {
            Ok(removed) => {
                if removed > 0 {
                    info!(
                        removed = removed,
                        threshold_secs = settings.wiping_threshold.as_secs(),
                        "Wiping sweep completed"
                    );
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "Wiping sweep failed");
                0
            }
        }
    }

    /// Runs the daemon until shutdown is signalled.
    ///
    /// The sleep duration is taken from the settings each cycle rather
    /// than from a fixed interval, so a committed period change takes
    /// effect on the next cycle.
    pub async fn run(self, shutdown: CancellationToken) {
        let settings = self.settings.current();
        info!(
            period_secs = settings.wiping_period.as_secs(),
            threshold_secs = settings.wiping_threshold.as_secs(),
            enabled = settings.wiping_enabled,
            "Wiping daemon starting"
        );

        loop {
            let period = self.settings.current().wiping_period;

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Wiping daemon shutting down");
                    break;
                }

                _ = tokio::time::sleep(period) => {
                    self.sweep_once();
                }
            }
        }
    }
}
