//! Result storage with interchangeable drivers and age-based wiping.
//!
//! The store persists two kinds of artifacts, both addressed by an opaque
//! string id: raw output payloads (fresh random id) and execution status
//! documents (keyed by the execution id). Drivers share one configuration
//! surface and are selected by the `backend` key, not by code change:
//!
//! - [`DirectoryStore`]: flat files in a spool directory
//! - [`SqliteStore`]: embedded single-file relational engine
//! - [`MemoryStore`]: in-process map, for tests and ephemeral deployments
//!
//! A [`WipingDaemon`] runs on its own periodic timer, independent of
//! request handling, and deletes artifacts older than the configured
//! threshold.

mod directory;
mod memory;
mod settings;
mod sqlite;
mod types;
mod wiping;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use settings::{
    StorageBackend, StorageSettings, StorageSettingsHandle, StorageSettingsObserver,
};
pub use sqlite::SqliteStore;
pub use types::{fresh_artifact_id, ResultStore, StoreError, StoredArtifact};
pub use wiping::WipingDaemon;

use std::sync::Arc;

/// Opens the driver selected by the settings' `backend` key.
pub fn open_store(settings: &StorageSettings) -> Result<Arc<dyn ResultStore>, StoreError> {
    match settings.backend {
        StorageBackend::Directory => Ok(Arc::new(DirectoryStore::new(
            settings.spool_dir.clone(),
        )?)),
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&settings.database_path)?)),
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
