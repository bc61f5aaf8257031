//! In-process store driver.

use super::types::{validate_id, ResultStore, StoreError, StoredArtifact};
use chrono::Utc;
use dashmap::DashMap;
use std::time::Duration;

/// Map-backed driver for tests and ephemeral deployments. Artifacts do
/// not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    artifacts: DashMap<String, StoredArtifact>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn store(&self, id: &str, bytes: &[u8], mime_type: &str) -> Result<(), StoreError> {
        validate_id(id)?;
        self.artifacts.insert(
            id.to_string(),
            StoredArtifact {
                id: id.to_string(),
                bytes: bytes.to_vec(),
                mime_type: mime_type.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn get(&self, id: &str) -> Result<StoredArtifact, StoreError> {
        validate_id(id)?;
        self.artifacts
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        validate_id(id)?;
        self.artifacts.remove(id);
        Ok(())
    }

    fn sweep(&self, max_age: Duration) -> Result<usize, StoreError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age)
                .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
        let before = self.artifacts.len();
        self.artifacts.retain(|_, artifact| artifact.created_at >= cutoff);
        Ok(before - self.artifacts.len())
    }

    fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_get_round_trip() {
        let store = MemoryStore::new();
        store.store("abc", b"payload", "text/plain").unwrap();
        assert_eq!(store.get("abc").unwrap().bytes, b"payload");
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.get("missing"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn sweep_with_zero_age_removes_everything() {
        let store = MemoryStore::new();
        store.store("a", b"1", "text/plain").unwrap();
        store.store("b", b"2", "text/plain").unwrap();

        let removed = store.sweep(Duration::ZERO).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.artifact_count(), 0);
    }

    #[test]
    fn sweep_keeps_fresh_artifacts() {
        let store = MemoryStore::new();
        store.store("a", b"1", "text/plain").unwrap();
        let removed = store.sweep(Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(store.artifact_count(), 1);
    }
}
