//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file. These
//! are pure data types; parsing and validation live in the parser.

use crate::store::StorageSettings;
use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    /// Server identity and listen address.
    pub server: ServerSettings,
    /// Worker pool sizing and the synchronous wait timeout.
    pub execution: ExecutionSettings,
    /// Result store backend and wiping policy.
    pub storage: StorageSettings,
    /// Remote input resolution limits.
    pub resolver: ResolverSettings,
    /// Log file location.
    pub logging: LoggingSettings,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Title advertised in the capabilities document.
    pub title: String,
    /// Host used for the listen address and for constructing retrieval
    /// URLs in by-reference outputs.
    pub host: String,
    /// Port, same dual use as `host`.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            title: "GeoProc processing service".to_string(),
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

/// Execution scheduler configuration.
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    /// Fixed worker concurrency.
    pub worker_count: usize,
    /// Bounded queue capacity; a full queue rejects with ServerBusy.
    pub queue_capacity: usize,
    /// How long a synchronous Execute call waits before answering
    /// Accepted and leaving the job running.
    pub sync_timeout: Duration,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            worker_count: 8,
            queue_capacity: 64,
            sync_timeout: Duration::from_secs(20),
        }
    }
}

/// Reference resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Transport timeout for one fetch. The resolver has no extra
    /// deadline of its own.
    pub timeout: Duration,
    /// Referenced payloads larger than this fail with FileSizeExceeded.
    pub max_body_bytes: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_body_bytes: 128 * 1024 * 1024,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Directory for log files.
    pub directory: PathBuf,
    /// Log file name.
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file: "geoproc.log".to_string(),
        }
    }
}
