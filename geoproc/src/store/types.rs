//! Core types and the driver trait for the result store.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// One persisted payload: opaque id, bytes, mime type, creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    /// Opaque identifier; generated by [`fresh_artifact_id`] or supplied
    /// by the caller (execution ids for status documents).
    pub id: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

/// Store-related errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No artifact under the given id (never stored, or already wiped).
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// The id is not usable as a storage key.
    #[error("invalid artifact id: {0}")]
    InvalidId(String),

    /// I/O failure in a filesystem driver.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure in a relational driver.
    #[error("store database error: {0}")]
    Database(String),

    /// Rejected configuration value.
    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),
}

/// A result-store driver.
///
/// Writes are visible to subsequent reads as soon as `store` returns.
/// Implementations synchronize internally; callers need no external
/// locking.
pub trait ResultStore: Send + Sync {
    /// Persists bytes under the given id, replacing any previous artifact
    /// with the same id.
    fn store(&self, id: &str, bytes: &[u8], mime_type: &str) -> Result<(), StoreError>;

    /// Retrieves the artifact stored under `id`.
    fn get(&self, id: &str) -> Result<StoredArtifact, StoreError>;

    /// Removes the artifact stored under `id`, if present.
    fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Deletes every artifact older than `max_age` and returns how many
    /// were removed.
    fn sweep(&self, max_age: Duration) -> Result<usize, StoreError>;

    /// Number of artifacts currently held.
    fn artifact_count(&self) -> usize;
}

/// Generates a fresh random artifact id.
pub fn fresh_artifact_id() -> String {
    Uuid::new_v4().to_string()
}

/// Rejects ids that could escape a driver's namespace (path separators,
/// parent references, empty strings).
pub(super) fn validate_id(id: &str) -> Result<(), StoreError> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !id.contains("..");
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}
