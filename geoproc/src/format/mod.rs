//! Output format model and negotiation.
//!
//! A [`Format`] is a triple of mime type, encoding, and schema, each
//! independently optional and compared case-insensitively. Negotiation
//! treats the three axes independently: a requested format that only pins
//! the mime type acts as a wildcard across encoding and schema.
//!
//! [`select`] is a pure function; the same inputs always yield the same
//! output, which keeps negotiation testable in isolation.

mod negotiator;
mod types;

pub use negotiator::select;
pub use types::{Format, FormatPermutation};
