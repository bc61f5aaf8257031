//! Service construction errors.

use crate::resolver::HttpError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors raised while building or running the service facade.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Result store could not be opened or configured.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The outbound HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] HttpError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigFileError),
}
