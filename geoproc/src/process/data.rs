//! Typed process values.
//!
//! A [`ProcessData`] is the tagged union flowing into and out of
//! algorithms: literal, bounding box, or complex. Encoding dispatches on
//! the tag; adding a new variant means adding a new tag plus its encode
//! arm, not a subclass.

use crate::format::Format;

/// One typed value, input or output.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessData {
    Literal(LiteralData),
    BoundingBox(BoundingBoxData),
    Complex(ComplexData),
}

impl ProcessData {
    /// Convenience constructor for a plain literal with no type binding.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(LiteralData {
            value: value.into(),
            data_type: None,
            uom: None,
        })
    }

    /// Convenience constructor for complex text content.
    pub fn complex_text(text: impl Into<String>, format: Format) -> Self {
        Self::Complex(ComplexData {
            payload: ComplexPayload::Text(text.into()),
            format,
        })
    }

    /// Convenience constructor for complex binary content.
    pub fn complex_bytes(bytes: Vec<u8>, format: Format) -> Self {
        Self::Complex(ComplexData {
            payload: ComplexPayload::Bytes(bytes),
            format,
        })
    }

    pub fn as_literal(&self) -> Option<&LiteralData> {
        match self {
            Self::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_bounding_box(&self) -> Option<&BoundingBoxData> {
        match self {
            Self::BoundingBox(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexData> {
        match self {
            Self::Complex(c) => Some(c),
            _ => None,
        }
    }
}

/// A literal value with its declared data type and unit of measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralData {
    pub value: String,
    /// XML schema data type reference, e.g. `xs:double`.
    pub data_type: Option<String>,
    /// Unit of measure attached to the value.
    pub uom: Option<String>,
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBoxData {
    pub lower_corner: Vec<f64>,
    pub upper_corner: Vec<f64>,
    /// Coordinate reference system identifier, if known.
    pub crs: Option<String>,
}

impl BoundingBoxData {
    pub fn new(lower_corner: Vec<f64>, upper_corner: Vec<f64>, crs: Option<String>) -> Self {
        Self {
            lower_corner,
            upper_corner,
            crs,
        }
    }

    /// Number of dimensions, taken from the lower corner.
    pub fn dimensions(&self) -> usize {
        self.lower_corner.len()
    }
}

/// Complex content: a payload plus the format it resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexData {
    pub payload: ComplexPayload,
    pub format: Format,
}

/// The concrete shape of a complex payload, used for generator lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexPayload {
    /// Character content.
    Text(String),
    /// Opaque binary content.
    Bytes(Vec<u8>),
}

impl ComplexPayload {
    /// Short kind name used in generator lookups and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Text(t) => t.len(),
            Self::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One computed output joined with its descriptor metadata, ready for
/// encoding.
#[derive(Debug, Clone)]
pub struct ProcessOutputValue {
    pub identifier: String,
    pub title: Option<String>,
    pub abstract_: Option<String>,
    pub data: ProcessData,
}
