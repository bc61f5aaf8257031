//! Flat-file store driver over a spool directory.

use super::types::{validate_id, ResultStore, StoreError, StoredArtifact};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Extension of payload files in the spool directory.
const PAYLOAD_EXT: &str = "bin";

/// Extension of the sidecar carrying the payload's mime type.
const MIME_EXT: &str = "mime";

/// Stores each artifact as `<spool>/<id>.bin` with a `<id>.mime` sidecar.
///
/// An in-memory index (id → creation time) is rebuilt by scanning the
/// spool directory on startup, so artifacts survive restarts.
pub struct DirectoryStore {
    spool_dir: PathBuf,
    /// Index of stored artifacts (id → creation time).
    index: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl DirectoryStore {
    /// Opens the spool directory, creating it if needed, and rebuilds the
    /// index from the files already present.
    pub fn new(spool_dir: PathBuf) -> Result<Self, StoreError> {
        if !spool_dir.exists() {
            fs::create_dir_all(&spool_dir)?;
        }

        let store = Self {
            spool_dir,
            index: Mutex::new(HashMap::new()),
        };
        store.scan_spool_dir()?;
        Ok(store)
    }

    fn payload_path(&self, id: &str) -> PathBuf {
        self.spool_dir.join(format!("{}.{}", id, PAYLOAD_EXT))
    }

    fn mime_path(&self, id: &str) -> PathBuf {
        self.spool_dir.join(format!("{}.{}", id, MIME_EXT))
    }

    /// Rebuilds the index from payload files found in the spool directory.
    fn scan_spool_dir(&self) -> Result<(), StoreError> {
        let mut index = self.index.lock().unwrap();
        for entry in fs::read_dir(&self.spool_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(PAYLOAD_EXT) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match file_created_at(&path) {
                Ok(created_at) => {
                    index.insert(id.to_string(), created_at);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable spool entry");
                }
            }
        }

        info!(
            spool_dir = %self.spool_dir.display(),
            artifacts = index.len(),
            "Directory store opened"
        );
        Ok(())
    }
}

fn file_created_at(path: &Path) -> Result<DateTime<Utc>, std::io::Error> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Utc>::from(modified))
}

impl ResultStore for DirectoryStore {
    fn store(&self, id: &str, bytes: &[u8], mime_type: &str) -> Result<(), StoreError> {
        validate_id(id)?;

        fs::write(self.payload_path(id), bytes)?;
        fs::write(self.mime_path(id), mime_type)?;

        let mut index = self.index.lock().unwrap();
        index.insert(id.to_string(), Utc::now());

        debug!(id = id, bytes = bytes.len(), mime_type = mime_type, "Artifact stored");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<StoredArtifact, StoreError> {
        validate_id(id)?;

        let created_at = {
            let index = self.index.lock().unwrap();
            match index.get(id) {
                Some(t) => *t,
                None => return Err(StoreError::NotFound(id.to_string())),
            }
        };

        let bytes = match fs::read(self.payload_path(id)) {
            Ok(b) => b,
            Err(_) => {
                // File vanished underneath the index (external cleanup).
                let mut index = self.index.lock().unwrap();
                index.remove(id);
                return Err(StoreError::NotFound(id.to_string()));
            }
        };
        let mime_type = fs::read_to_string(self.mime_path(id))
            .unwrap_or_else(|_| "application/octet-stream".to_string());

        Ok(StoredArtifact {
            id: id.to_string(),
            bytes,
            mime_type,
            created_at,
        })
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        validate_id(id)?;

        let mut index = self.index.lock().unwrap();
        index.remove(id);
        let _ = fs::remove_file(self.payload_path(id));
        let _ = fs::remove_file(self.mime_path(id));
        Ok(())
    }

    fn sweep(&self, max_age: Duration) -> Result<usize, StoreError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age)
                .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;

        let expired: Vec<String> = {
            let index = self.index.lock().unwrap();
            index
                .iter()
                .filter(|(_, created_at)| **created_at < cutoff)
                .map(|(id, _)| id.clone())
                .collect()
        };

        for id in &expired {
            self.delete(id)?;
        }

        if !expired.is_empty() {
            info!(removed = expired.len(), "Spool sweep removed expired artifacts");
        }
        Ok(expired.len())
    }

    fn artifact_count(&self) -> usize {
        self.index.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_temp_store() -> (DirectoryStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path().join("spool")).unwrap();
        (store, temp)
    }

    #[test]
    fn store_and_get_round_trip() {
        let (store, _temp) = create_temp_store();
        store.store("abc-123", b"payload", "image/tiff").unwrap();

        let artifact = store.get("abc-123").unwrap();
        assert_eq!(artifact.bytes, b"payload");
        assert_eq!(artifact.mime_type, "image/tiff");
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let (store, _temp) = create_temp_store();
        assert!(matches!(store.get("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn store_replaces_existing_artifact() {
        let (store, _temp) = create_temp_store();
        store.store("id1", b"first", "text/plain").unwrap();
        store.store("id1", b"second", "text/xml").unwrap();

        let artifact = store.get("id1").unwrap();
        assert_eq!(artifact.bytes, b"second");
        assert_eq!(artifact.mime_type, "text/xml");
        assert_eq!(store.artifact_count(), 1);
    }

    #[test]
    fn delete_removes_payload_and_sidecar() {
        let (store, _temp) = create_temp_store();
        store.store("id1", b"x", "text/plain").unwrap();
        store.delete("id1").unwrap();

        assert!(matches!(store.get("id1"), Err(StoreError::NotFound(_))));
        assert_eq!(store.artifact_count(), 0);
    }

    #[test]
    fn artifacts_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let spool = temp.path().join("spool");
        {
            let store = DirectoryStore::new(spool.clone()).unwrap();
            store.store("persist-me", b"data", "text/plain").unwrap();
        }
        let store = DirectoryStore::new(spool).unwrap();
        assert_eq!(store.artifact_count(), 1);
        assert_eq!(store.get("persist-me").unwrap().bytes, b"data");
    }

    #[test]
    fn sweep_removes_only_expired_artifacts() {
        let (store, _temp) = create_temp_store();
        store.store("old", b"x", "text/plain").unwrap();
        {
            // Backdate the index entry well past any threshold.
            let mut index = store.index.lock().unwrap();
            index.insert("old".to_string(), Utc::now() - chrono::Duration::hours(2));
        }
        store.store("fresh", b"y", "text/plain").unwrap();

        let removed = store.sweep(Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("old").is_err());
        assert!(store.get("fresh").is_ok());
    }

    #[test]
    fn invalid_id_is_rejected() {
        let (store, _temp) = create_temp_store();
        assert!(matches!(
            store.store("../escape", b"x", "text/plain"),
            Err(StoreError::InvalidId(_))
        ));
    }
}
