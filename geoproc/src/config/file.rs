//! Config file loading.

use super::parser::parse_ini;
use super::settings::ConfigFile;
use ini::Ini;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading or validating the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(String),

    /// A value failed validation; prior configuration stays in effect.
    #[error("invalid value for [{section}] {key} = {value}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Loads and validates a config file. A missing file yields the
/// compiled-in defaults; a present but invalid file is an error.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigFileError> {
    if !path.exists() {
        info!(path = %path.display(), "No config file, using defaults");
        return Ok(ConfigFile::default());
    }

    let ini = Ini::load_from_file(path).map_err(|e| ConfigFileError::Parse(e.to_string()))?;
    let config = parse_ini(&ini)?;
    info!(path = %path.display(), "Config file loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/geoproc.ini")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn file_values_overlay_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[execution]\nworker_count = 2\n"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.execution.worker_count, 2);
        // Untouched sections keep their defaults.
        assert_eq!(config.execution.queue_capacity, 64);
    }

    #[test]
    fn invalid_value_reports_section_and_key() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[execution]\nworker_count = zero\n").unwrap();

        let err = load_config(file.path()).unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "execution");
                assert_eq!(key, "worker_count");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }
}
