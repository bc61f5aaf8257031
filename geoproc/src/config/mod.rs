//! Server configuration loaded from an INI file.
//!
//! Parsing overlays file values onto compiled-in defaults, so a missing
//! file or a partial one is always usable. Every value is validated at
//! parse time; a bad value is reported with its section, key, and reason
//! and never half-applies.

mod file;
mod parser;
mod settings;

pub use file::{load_config, ConfigFileError};
pub use settings::{
    ConfigFile, ExecutionSettings, LoggingSettings, ResolverSettings, ServerSettings,
};
