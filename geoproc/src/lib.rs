//! GeoProc - Geospatial process execution server
//!
//! This library implements the execution and delivery pipeline of a
//! geospatial processing service: request classification and validation,
//! admission-controlled job scheduling with a synchronous/asynchronous
//! response split, output format negotiation, polymorphic output encoding,
//! pluggable result storage with age-based wiping, and HTTP dereferencing
//! of remote inputs.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use geoproc::config::ConfigFile;
//! use geoproc::service::ProcessingService;
//!
//! let service = ProcessingService::builder(ConfigFile::default())
//!     .register(my_descriptor, my_algorithm)
//!     .build()?;
//!
//! let outcome = service.dispatch(raw_request).await;
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod format;
pub mod logging;
pub mod process;
pub mod protocol;
pub mod resolver;
pub mod scheduler;
pub mod service;
pub mod store;

/// Version of the GeoProc library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service type accepted in the `service` request parameter.
pub const SERVICE_TYPE: &str = "WPS";

/// The single protocol version this server speaks.
pub const PROTOCOL_VERSION: &str = "1.0.0";
