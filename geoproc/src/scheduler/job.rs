//! Execution identifiers and job descriptions.

use crate::error::ServiceException;
use crate::format::Format;
use crate::process::ProcessData;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Opaque identifier naming one Execute invocation. Generated at
/// submission, stable for the job's lifetime, and the key under which
/// the terminal status document is stored.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct ExecutionId(String);

impl ExecutionId {
    /// Generates a fresh unique execution id.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecutionId({})", self.0)
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One requested output with its delivery flags.
#[derive(Debug, Clone)]
pub struct OutputRequest {
    pub identifier: String,
    /// Deliver as a stored reference instead of inline.
    pub as_reference: bool,
    /// Requested format; unspecified axes fall back to the descriptor's
    /// default during negotiation.
    pub format: Format,
}

impl OutputRequest {
    pub fn inline(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            as_reference: false,
            format: Format::unspecified(),
        }
    }

    pub fn by_reference(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            as_reference: true,
            format: Format::unspecified(),
        }
    }
}

/// How the Execute response is delivered.
#[derive(Debug, Clone)]
pub enum ResponseForm {
    /// A response document listing the requested outputs. An empty
    /// output list means every declared output, inline, default format.
    Document {
        outputs: Vec<OutputRequest>,
        /// Echo the request's inputs and output definitions back.
        lineage: bool,
        /// Fire-and-store: answer Accepted immediately and persist the
        /// eventual result.
        store_response: bool,
        /// Include status in stored documents.
        status: bool,
    },
    /// Bare output bytes with the negotiated mime type.
    RawData(OutputRequest),
}

impl ResponseForm {
    pub fn default_document() -> Self {
        Self::Document {
            outputs: Vec::new(),
            lineage: false,
            store_response: false,
            status: false,
        }
    }

    /// True when the caller asked for fire-and-store delivery.
    pub fn stores_response(&self) -> bool {
        matches!(
            self,
            Self::Document {
                store_response: true,
                ..
            }
        )
    }
}

/// One validated process invocation, ready for scheduling.
#[derive(Debug, Clone)]
pub struct ExecuteJob {
    pub process_id: String,
    pub inputs: HashMap<String, Vec<ProcessData>>,
    pub response_form: ResponseForm,
}

/// Response bytes plus the content type they travel with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ResponseBody {
    pub fn xml(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: "text/xml".to_string(),
        }
    }

    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }
}

/// The deferred work of one execution: runs the algorithm and builds the
/// final response body. The scheduler hands it the job's cancellation
/// token; the closure is expected to propagate it into the algorithm.
pub type ExecutionWork = Box<
    dyn FnOnce(
            CancellationToken,
        )
            -> Pin<Box<dyn Future<Output = Result<ResponseBody, ServiceException>> + Send>>
        + Send,
>;
