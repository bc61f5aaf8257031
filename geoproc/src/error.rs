//! Protocol-level exception taxonomy.
//!
//! Every failure that can reach a client is one of the variants below.
//! Each carries a human-readable message, most carry an optional "locator"
//! naming the offending parameter, and wrapping variants keep their cause
//! for logging. Uncategorized failures are wrapped as [`NoApplicableCode`]
//! so a client always receives a well-formed exception report instead of a
//! raw error.
//!
//! [`NoApplicableCode`]: ServiceException::NoApplicableCode

use thiserror::Error;

/// Boxed error cause attached to wrapping exception variants.
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// A client-visible service exception.
#[derive(Debug, Error)]
pub enum ServiceException {
    /// A required request parameter was absent.
    #[error("missing parameter: {locator}")]
    MissingParameterValue {
        /// Name of the absent parameter.
        locator: String,
    },

    /// A request parameter carried an unusable value.
    #[error("{message}")]
    InvalidParameterValue {
        message: String,
        /// Name of the offending parameter, if attributable.
        locator: Option<String>,
        #[source]
        source: Option<Cause>,
    },

    /// The named operation is not part of the protocol.
    #[error("operation not supported: {operation}")]
    OperationNotSupported { operation: String },

    /// Admission control rejected the request; the execution queue is full.
    #[error("server is busy: {message}")]
    ServerBusy { message: String },

    /// No more specific code applies. Also the wrapper for uncategorized
    /// internal failures.
    #[error("{message}")]
    NoApplicableCode {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// The algorithm itself failed during execution.
    #[error("computation failed: {message}")]
    RemoteComputationError {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// A referenced input exceeded the configured size cap.
    #[error("{message}")]
    FileSizeExceeded {
        message: String,
        locator: Option<String>,
    },

    /// None of the client's accepted versions is supported.
    #[error("version negotiation failed: {message}")]
    VersionNegotiationFailed { message: String },
}

impl ServiceException {
    /// A `MissingParameterValue` for the named parameter.
    pub fn missing_parameter(locator: impl Into<String>) -> Self {
        Self::MissingParameterValue {
            locator: locator.into(),
        }
    }

    /// An `InvalidParameterValue` with a locator.
    pub fn invalid_parameter(message: impl Into<String>, locator: impl Into<String>) -> Self {
        Self::InvalidParameterValue {
            message: message.into(),
            locator: Some(locator.into()),
            source: None,
        }
    }

    /// An `InvalidParameterValue` keeping its underlying cause.
    pub fn invalid_parameter_caused_by(
        message: impl Into<String>,
        locator: impl Into<String>,
        source: impl Into<Cause>,
    ) -> Self {
        Self::InvalidParameterValue {
            message: message.into(),
            locator: Some(locator.into()),
            source: Some(source.into()),
        }
    }

    /// A `NoApplicableCode` with only a message.
    pub fn no_applicable_code(message: impl Into<String>) -> Self {
        Self::NoApplicableCode {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an uncategorized failure as `NoApplicableCode`.
    pub fn wrap(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::NoApplicableCode {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// A `RemoteComputationError` for an algorithm failure.
    pub fn computation_failed(message: impl Into<String>) -> Self {
        Self::RemoteComputationError {
            message: message.into(),
            source: None,
        }
    }

    /// The wire exception code for this variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameterValue { .. } => "MissingParameterValue",
            Self::InvalidParameterValue { .. } => "InvalidParameterValue",
            Self::OperationNotSupported { .. } => "OperationNotSupported",
            Self::ServerBusy { .. } => "ServerBusy",
            Self::NoApplicableCode { .. } => "NoApplicableCode",
            Self::RemoteComputationError { .. } => "RemoteComputationError",
            Self::FileSizeExceeded { .. } => "FileSizeExceeded",
            Self::VersionNegotiationFailed { .. } => "VersionNegotiationFailed",
        }
    }

    /// The parameter name this exception points at, if any.
    pub fn locator(&self) -> Option<&str> {
        match self {
            Self::MissingParameterValue { locator } => Some(locator),
            Self::InvalidParameterValue { locator, .. } => locator.as_deref(),
            Self::OperationNotSupported { operation } => Some(operation),
            Self::FileSizeExceeded { locator, .. } => locator.as_deref(),
            _ => None,
        }
    }

    /// The HTTP status an exception report for this variant travels with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ServerBusy { .. } => 503,
            Self::NoApplicableCode { .. } | Self::RemoteComputationError { .. } => 500,
            _ => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_carries_locator() {
        let e = ServiceException::missing_parameter("version");
        assert_eq!(e.code(), "MissingParameterValue");
        assert_eq!(e.locator(), Some("version"));
        assert_eq!(e.http_status(), 400);
    }

    #[test]
    fn invalid_parameter_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let e = ServiceException::invalid_parameter_caused_by("bad href", "href", io);
        assert_eq!(e.code(), "InvalidParameterValue");
        assert_eq!(e.locator(), Some("href"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn wrap_is_no_applicable_code() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let e = ServiceException::wrap("unexpected failure", io);
        assert_eq!(e.code(), "NoApplicableCode");
        assert_eq!(e.http_status(), 500);
        assert!(e.locator().is_none());
    }

    #[test]
    fn server_busy_maps_to_503() {
        let e = ServiceException::ServerBusy {
            message: "queue full".to_string(),
        };
        assert_eq!(e.http_status(), 503);
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceException::invalid_parameter("no such process", "identifier");
        assert_eq!(format!("{}", e), "no such process");
    }
}
