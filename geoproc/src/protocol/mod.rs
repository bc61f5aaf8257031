//! Protocol surface: request classification, validation, dispatch, and
//! response serialization.
//!
//! The dispatcher is transport-agnostic: it consumes a [`RawRequest`]
//! (key/value query parameters or an XML body, with SOAP envelopes
//! unwrapped transparently) and produces a [`DispatchOutcome`] carrying
//! status, content type, and body bytes. The HTTP binding in the CLI is
//! a thin adapter over this.
//!
//! Validation happens as early as possible and short-circuits before any
//! job is scheduled; every failure is rendered as a well-formed exception
//! report.

mod dispatcher;
mod request;
mod response;
mod xml;

pub use dispatcher::{DispatchOutcome, DispatcherConfig, RequestDispatcher};
pub use request::{
    parse_request, ExecuteContent, InputValue, OperationRequest, ParsedRequest, RawRequest,
    ReferenceValue,
};
pub use response::{exception_report, ExecutionStatusElement, XmlStatusRenderer, DEFAULT_LANGUAGE};
