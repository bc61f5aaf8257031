//! Storage configuration with validate-then-commit setters and
//! synchronous observer notification.

use super::types::StoreError;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::info;

/// Which driver backs the result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Flat files in a spool directory.
    #[default]
    Directory,
    /// Embedded single-file relational engine.
    Sqlite,
    /// In-process map; artifacts do not survive restarts.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "directory" | "flatfile" => Ok(Self::Directory),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

/// The shared configuration surface of all store drivers.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// Driver selection key.
    pub backend: StorageBackend,
    /// Spool directory for the directory driver.
    pub spool_dir: PathBuf,
    /// Database file for the sqlite driver.
    pub database_path: PathBuf,
    /// Host of a remote backend. Validated and reserved; the embedded
    /// drivers ignore it.
    pub host: Option<String>,
    /// Port of a remote backend.
    pub port: Option<u16>,
    /// Credentials of a remote backend.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Whether the wiping sweep runs at all.
    pub wiping_enabled: bool,
    /// Maximum artifact age before the sweep deletes it.
    pub wiping_threshold: Duration,
    /// Interval between sweep runs.
    pub wiping_period: Duration,
}

impl Default for StorageSettings {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geoproc");

        Self {
            backend: StorageBackend::Directory,
            spool_dir: data_dir.join("spool"),
            database_path: data_dir.join("results.db"),
            host: None,
            port: None,
            username: None,
            password: None,
            wiping_enabled: true,
            wiping_threshold: Duration::from_secs(3600),
            wiping_period: Duration::from_secs(15 * 60),
        }
    }
}

impl StorageSettings {
    /// Checks the whole settings object for structural validity.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.wiping_threshold.is_zero() {
            return Err(StoreError::InvalidConfig(
                "wiping threshold must be strictly positive".to_string(),
            ));
        }
        if self.wiping_period.is_zero() {
            return Err(StoreError::InvalidConfig(
                "wiping period must be strictly positive".to_string(),
            ));
        }
        if self.host.is_some() && self.port.is_none() {
            return Err(StoreError::InvalidConfig(
                "a remote backend host requires a port".to_string(),
            ));
        }
        Ok(())
    }
}

/// Observer notified synchronously after a settings change commits.
pub trait StorageSettingsObserver: Send + Sync {
    fn settings_changed(&self, settings: &StorageSettings);
}

/// Shared, hot-swappable storage settings.
///
/// Every mutation validates first and commits only a fully valid object;
/// a rejected change leaves the prior configuration intact. Commits and
/// reads are serialized by one lock, so a reader never observes a
/// half-updated object. After a commit, registered observers are
/// notified synchronously in registration order.
pub struct StorageSettingsHandle {
    current: RwLock<StorageSettings>,
    observers: Mutex<Vec<Arc<dyn StorageSettingsObserver>>>,
}

impl StorageSettingsHandle {
    /// Wraps validated settings in a shared handle.
    pub fn new(settings: StorageSettings) -> Result<Arc<Self>, StoreError> {
        settings.validate()?;
        Ok(Arc::new(Self {
            current: RwLock::new(settings),
            observers: Mutex::new(Vec::new()),
        }))
    }

    /// Snapshot of the current settings.
    pub fn current(&self) -> StorageSettings {
        self.current.read().unwrap().clone()
    }

    /// Registers an observer for future commits.
    pub fn subscribe(&self, observer: Arc<dyn StorageSettingsObserver>) {
        self.observers.lock().unwrap().push(observer);
    }

    /// Validates and applies a whole new settings object.
    pub fn apply(&self, settings: StorageSettings) -> Result<(), StoreError> {
        settings.validate()?;
        {
            let mut current = self.current.write().unwrap();
            *current = settings.clone();
        }
        info!(backend = ?settings.backend, "Storage settings applied");
        self.notify(&settings);
        Ok(())
    }

    /// Sets the wiping threshold; rejects non-positive values.
    pub fn set_wiping_threshold(&self, threshold: Duration) -> Result<(), StoreError> {
        self.mutate(|s| s.wiping_threshold = threshold)
    }

    /// Sets the sweep interval; rejects non-positive values.
    pub fn set_wiping_period(&self, period: Duration) -> Result<(), StoreError> {
        self.mutate(|s| s.wiping_period = period)
    }

    /// Turns the wiping sweep on or off.
    pub fn set_wiping_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.mutate(|s| s.wiping_enabled = enabled)
    }

    /// Validate-then-commit: the mutation runs on a copy, the copy is
    /// validated, and only then swapped in.
    fn mutate(&self, f: impl FnOnce(&mut StorageSettings)) -> Result<(), StoreError> {
        let committed = {
            let mut current = self.current.write().unwrap();
            let mut candidate = current.clone();
            f(&mut candidate);
            candidate.validate()?;
            *current = candidate.clone();
            candidate
        };
        self.notify(&committed);
        Ok(())
    }

    fn notify(&self, settings: &StorageSettings) {
        let observers = self.observers.lock().unwrap();
        for observer in observers.iter() {
            observer.settings_changed(settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver {
        calls: AtomicUsize,
    }

    impl StorageSettingsObserver for CountingObserver {
        fn settings_changed(&self, _settings: &StorageSettings) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Directory".parse::<StorageBackend>().unwrap(), StorageBackend::Directory);
        assert_eq!("SQLITE".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn default_settings_are_valid_and_wiping_is_on() {
        let settings = StorageSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.wiping_enabled);
    }

    #[test]
    fn non_positive_threshold_is_rejected_and_prior_value_kept() {
        let handle = StorageSettingsHandle::new(StorageSettings::default()).unwrap();
        let before = handle.current().wiping_threshold;

        let result = handle.set_wiping_threshold(Duration::ZERO);
        assert!(result.is_err());
        assert_eq!(handle.current().wiping_threshold, before);
    }

    #[test]
    fn non_positive_period_is_rejected() {
        let handle = StorageSettingsHandle::new(StorageSettings::default()).unwrap();
        assert!(handle.set_wiping_period(Duration::ZERO).is_err());
    }

    #[test]
    fn committed_change_notifies_observers() {
        let handle = StorageSettingsHandle::new(StorageSettings::default()).unwrap();
        let observer = Arc::new(CountingObserver {
            calls: AtomicUsize::new(0),
        });
        handle.subscribe(observer.clone());

        handle.set_wiping_threshold(Duration::from_secs(60)).unwrap();
        assert_eq!(observer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.current().wiping_threshold, Duration::from_secs(60));
    }

    #[test]
    fn rejected_change_does_not_notify() {
        let handle = StorageSettingsHandle::new(StorageSettings::default()).unwrap();
        let observer = Arc::new(CountingObserver {
            calls: AtomicUsize::new(0),
        });
        handle.subscribe(observer.clone());

        let _ = handle.set_wiping_threshold(Duration::ZERO);
        assert_eq!(observer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn host_without_port_is_invalid() {
        let mut settings = StorageSettings::default();
        settings.host = Some("db.example.com".to_string());
        assert!(settings.validate().is_err());

        settings.port = Some(5432);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn apply_swaps_whole_object() {
        let handle = StorageSettingsHandle::new(StorageSettings::default()).unwrap();
        let mut next = StorageSettings::default();
        next.backend = StorageBackend::Memory;
        next.wiping_enabled = false;

        handle.apply(next).unwrap();
        let current = handle.current();
        assert_eq!(current.backend, StorageBackend::Memory);
        assert!(!current.wiping_enabled);
    }
}
