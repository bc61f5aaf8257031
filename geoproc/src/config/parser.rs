//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct
//! fields. Parsing starts from `ConfigFile::default()` and overlays any
//! values found in the file.

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::store::StorageBackend;
use ini::Ini;
use std::path::PathBuf;
use std::time::Duration;

pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("title") {
            let v = v.trim();
            if !v.is_empty() {
                config.server.title = v.to_string();
            }
        }
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if !v.is_empty() {
                config.server.host = v.to_string();
            }
        }
        if let Some(v) = section.get("port") {
            config.server.port = v
                .parse()
                .map_err(|_| invalid("server", "port", v, "expected a port number"))?;
        }
    }

    // [execution] section
    if let Some(section) = ini.section(Some("execution")) {
        if let Some(v) = section.get("worker_count") {
            config.execution.worker_count = parse_positive("execution", "worker_count", v)?;
        }
        if let Some(v) = section.get("queue_capacity") {
            config.execution.queue_capacity = parse_positive("execution", "queue_capacity", v)?;
        }
        if let Some(v) = section.get("sync_timeout_secs") {
            config.execution.sync_timeout = parse_positive_secs("execution", "sync_timeout_secs", v)?;
        }
    }

    // [storage] section
    if let Some(section) = ini.section(Some("storage")) {
        if let Some(v) = section.get("backend") {
            config.storage.backend = v
                .parse::<StorageBackend>()
                .map_err(|reason| invalid("storage", "backend", v, &reason))?;
        }
        if let Some(v) = section.get("spool_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.storage.spool_dir = PathBuf::from(v);
            }
        }
        if let Some(v) = section.get("database_path") {
            let v = v.trim();
            if !v.is_empty() {
                config.storage.database_path = PathBuf::from(v);
            }
        }
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if !v.is_empty() {
                config.storage.host = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("port") {
            let port = v
                .parse()
                .map_err(|_| invalid("storage", "port", v, "expected a port number"))?;
            config.storage.port = Some(port);
        }
        if let Some(v) = section.get("username") {
            let v = v.trim();
            if !v.is_empty() {
                config.storage.username = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("password") {
            config.storage.password = Some(v.to_string());
        }
        if let Some(v) = section.get("wiping_enabled") {
            config.storage.wiping_enabled = parse_bool("storage", "wiping_enabled", v)?;
        }
        if let Some(v) = section.get("wiping_threshold_secs") {
            config.storage.wiping_threshold =
                parse_positive_secs("storage", "wiping_threshold_secs", v)?;
        }
        if let Some(v) = section.get("wiping_period_secs") {
            config.storage.wiping_period =
                parse_positive_secs("storage", "wiping_period_secs", v)?;
        }
    }

    // [resolver] section
    if let Some(section) = ini.section(Some("resolver")) {
        if let Some(v) = section.get("timeout_secs") {
            config.resolver.timeout = parse_positive_secs("resolver", "timeout_secs", v)?;
        }
        if let Some(v) = section.get("max_body_bytes") {
            config.resolver.max_body_bytes = parse_positive("resolver", "max_body_bytes", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = PathBuf::from(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    // Cross-field storage checks (host/port pairing).
    config.storage.validate().map_err(|e| {
        invalid("storage", "backend", &format!("{:?}", config.storage.backend), &e.to_string())
    })?;

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive(section: &str, key: &str, value: &str) -> Result<usize, ConfigFileError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(section, key, value, "expected a positive integer")),
    }
}

fn parse_positive_secs(section: &str, key: &str, value: &str) -> Result<Duration, ConfigFileError> {
    parse_positive(section, key, value).map(|secs| Duration::from_secs(secs as u64))
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn empty_ini_yields_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.server.host, "localhost");
        assert!(config.storage.wiping_enabled);
    }

    #[test]
    fn storage_backend_selection_by_key() {
        let config = parse("[storage]\nbackend = sqlite\n").unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn unknown_backend_is_invalid() {
        let err = parse("[storage]\nbackend = oracle\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { .. }));
    }

    #[test]
    fn non_positive_wiping_threshold_is_rejected() {
        let err = parse("[storage]\nwiping_threshold_secs = 0\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "storage");
                assert_eq!(key, "wiping_threshold_secs");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn non_positive_wiping_period_is_rejected() {
        assert!(parse("[storage]\nwiping_period_secs = 0\n").is_err());
    }

    #[test]
    fn wiping_can_be_disabled_explicitly() {
        let config = parse("[storage]\nwiping_enabled = false\n").unwrap();
        assert!(!config.storage.wiping_enabled);
    }

    #[test]
    fn storage_host_without_port_fails_cross_field_check() {
        assert!(parse("[storage]\nhost = db.example.com\n").is_err());
        assert!(parse("[storage]\nhost = db.example.com\nport = 5432\n").is_ok());
    }

    #[test]
    fn execution_sizing_is_parsed() {
        let config = parse(
            "[execution]\nworker_count = 4\nqueue_capacity = 16\nsync_timeout_secs = 5\n",
        )
        .unwrap();
        assert_eq!(config.execution.worker_count, 4);
        assert_eq!(config.execution.queue_capacity, 16);
        assert_eq!(config.execution.sync_timeout, Duration::from_secs(5));
    }

    #[test]
    fn resolver_limits_are_parsed() {
        let config = parse("[resolver]\ntimeout_secs = 10\nmax_body_bytes = 1024\n").unwrap();
        assert_eq!(config.resolver.timeout, Duration::from_secs(10));
        assert_eq!(config.resolver.max_body_bytes, 1024);
    }
}
