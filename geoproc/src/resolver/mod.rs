//! Dereferencing of remote input payloads.
//!
//! Execute inputs may arrive by reference: an `href` plus optional method,
//! headers, body, or body-reference. A [`ReferenceResolver`] holds an
//! ordered list of strategies, consulted in reverse registration order
//! (most recently registered first); the first strategy whose
//! `is_applicable` accepts the reference performs the fetch.
//!
//! The chain is an explicit object constructed at startup and passed by
//! reference into the dispatcher; there is no process-global registry.

mod chain;
mod default;
mod http;
mod types;

pub use chain::{ReferenceResolver, ReferenceStrategy};
pub use default::DefaultReferenceStrategy;
pub use http::{AsyncHttpClient, HttpError, HttpResponse, ReqwestClient};
pub use types::{InputReference, ReferenceInputStream, ReferenceMethod};
