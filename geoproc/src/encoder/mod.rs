//! Output encoding.
//!
//! Turns a computed [`ProcessOutputValue`] into a protocol-level output
//! element. Literal and bounding-box outputs encode directly; complex
//! outputs go through the [`Generator`] registry and either embed inline
//! (character data for textual formats, base64 otherwise) or are written
//! to the result store and delivered as a retrieval URL.
//!
//! All encode operations are synchronous and side-effect-free except the
//! store write on the by-reference path.

mod generator;

pub use generator::{Generator, GeneratorRegistry};

use crate::error::ServiceException;
use crate::format::Format;
use crate::process::{ProcessData, ProcessOutputValue};
use crate::store::{fresh_artifact_id, ResultStore};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::Arc;
use tracing::debug;

/// Inline body of a complex output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineBody {
    /// Embedded as character data (textual/XML formats).
    Text(String),
    /// Embedded as a base64 text node (binary formats).
    Base64(String),
}

/// One encoded output element, ready for response serialization.
#[derive(Debug, Clone)]
pub enum OutputElement {
    Literal {
        identifier: String,
        title: Option<String>,
        value: String,
        data_type: Option<String>,
        uom: Option<String>,
    },
    BoundingBox {
        identifier: String,
        title: Option<String>,
        lower_corner: Vec<f64>,
        upper_corner: Vec<f64>,
        dimensions: usize,
        crs: Option<String>,
    },
    ComplexInline {
        identifier: String,
        title: Option<String>,
        format: Format,
        body: InlineBody,
    },
    ComplexReference {
        identifier: String,
        title: Option<String>,
        format: Format,
        href: String,
    },
}

impl OutputElement {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Literal { identifier, .. }
            | Self::BoundingBox { identifier, .. }
            | Self::ComplexInline { identifier, .. }
            | Self::ComplexReference { identifier, .. } => identifier,
        }
    }
}

/// Encodes computed values into output elements.
pub struct OutputEncoder {
    generators: GeneratorRegistry,
    store: Arc<dyn ResultStore>,
    /// Host used when constructing retrieval URLs.
    host: String,
    /// Port used when constructing retrieval URLs.
    port: u16,
}

impl OutputEncoder {
    pub fn new(
        generators: GeneratorRegistry,
        store: Arc<dyn ResultStore>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            generators,
            store,
            host: host.into(),
            port,
        }
    }

    /// Retrieval URL for a stored artifact id, routed through the
    /// protocol's own RetrieveResult operation.
    pub fn retrieval_url(&self, id: &str) -> String {
        format!(
            "http://{}:{}/?service=WPS&request=RetrieveResult&id={}",
            self.host,
            self.port,
            urlencoding::encode(id)
        )
    }

    /// Encodes one output value, inline or by reference.
    pub fn encode(
        &self,
        value: &ProcessOutputValue,
        wants_reference: bool,
    ) -> Result<OutputElement, ServiceException> {
        match &value.data {
            ProcessData::Literal(literal) => Ok(OutputElement::Literal {
                identifier: value.identifier.clone(),
                title: value.title.clone(),
                value: literal.value.clone(),
                data_type: literal.data_type.clone(),
                uom: literal.uom.clone(),
            }),

            ProcessData::BoundingBox(bbox) => Ok(OutputElement::BoundingBox {
                identifier: value.identifier.clone(),
                title: value.title.clone(),
                lower_corner: bbox.lower_corner.clone(),
                upper_corner: bbox.upper_corner.clone(),
                dimensions: bbox.dimensions(),
                crs: bbox.crs.clone(),
            }),

            ProcessData::Complex(complex) => {
                let generator = self.generators.find(&complex.format, &complex.payload)?;
                let bytes = generator.generate(&complex.payload, &complex.format)?;
                debug!(
                    output = %value.identifier,
                    generator = generator.name(),
                    bytes = bytes.len(),
                    by_reference = wants_reference,
                    "Complex output generated"
                );

                if wants_reference {
                    let id = fresh_artifact_id();
                    let mime_type = complex
                        .format
                        .mime_type()
                        .unwrap_or("application/octet-stream");
                    self.store
                        .store(&id, &bytes, mime_type)
                        .map_err(|e| ServiceException::wrap("failed to store output", e))?;

                    Ok(OutputElement::ComplexReference {
                        identifier: value.identifier.clone(),
                        title: value.title.clone(),
                        format: complex.format.clone(),
                        href: self.retrieval_url(&id),
                    })
                } else {
                    let body = if complex.format.is_textual() {
                        InlineBody::Text(String::from_utf8_lossy(&bytes).into_owned())
                    } else {
                        InlineBody::Base64(BASE64.encode(&bytes))
                    };

                    Ok(OutputElement::ComplexInline {
                        identifier: value.identifier.clone(),
                        title: value.title.clone(),
                        format: complex.format.clone(),
                        body,
                    })
                }
            }
        }
    }

    /// Encodes one output as bare bytes plus the mime type to serve them
    /// with, for the raw-data response mode.
    pub fn encode_raw(
        &self,
        value: &ProcessOutputValue,
    ) -> Result<(Vec<u8>, String), ServiceException> {
        match &value.data {
            ProcessData::Literal(literal) => {
                Ok((literal.value.clone().into_bytes(), "text/plain".to_string()))
            }
            ProcessData::BoundingBox(bbox) => {
                let text = format!(
                    "{};{};{}",
                    join_coords(&bbox.lower_corner),
                    join_coords(&bbox.upper_corner),
                    bbox.crs.as_deref().unwrap_or("")
                );
                Ok((text.into_bytes(), "text/plain".to_string()))
            }
            ProcessData::Complex(complex) => {
                let generator = self.generators.find(&complex.format, &complex.payload)?;
                let bytes = generator.generate(&complex.payload, &complex.format)?;
                let mime_type = complex
                    .format
                    .mime_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                Ok((bytes, mime_type))
            }
        }
    }
}

fn join_coords(coords: &[f64]) -> String {
    coords
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{BoundingBoxData, LiteralData};
    use crate::store::MemoryStore;

    fn encoder() -> (OutputEncoder, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let encoder = OutputEncoder::new(
            GeneratorRegistry::with_builtins(),
            store.clone(),
            "localhost",
            8080,
        );
        (encoder, store)
    }

    fn output(identifier: &str, data: ProcessData) -> ProcessOutputValue {
        ProcessOutputValue {
            identifier: identifier.to_string(),
            title: None,
            abstract_: None,
            data,
        }
    }

    #[test]
    fn literal_encodes_with_bindings() {
        let (encoder, _) = encoder();
        let value = output(
            "area",
            ProcessData::Literal(LiteralData {
                value: "42.5".to_string(),
                data_type: Some("xs:double".to_string()),
                uom: Some("m2".to_string()),
            }),
        );

        match encoder.encode(&value, false).unwrap() {
            OutputElement::Literal {
                value,
                data_type,
                uom,
                ..
            } => {
                assert_eq!(value, "42.5");
                assert_eq!(data_type.as_deref(), Some("xs:double"));
                assert_eq!(uom.as_deref(), Some("m2"));
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn bounding_box_encodes_corners_and_crs() {
        let (encoder, _) = encoder();
        let value = output(
            "extent",
            ProcessData::BoundingBox(BoundingBoxData::new(
                vec![-10.0, -20.0],
                vec![10.0, 20.0],
                Some("EPSG:4326".to_string()),
            )),
        );

        match encoder.encode(&value, false).unwrap() {
            OutputElement::BoundingBox {
                lower_corner,
                upper_corner,
                dimensions,
                crs,
                ..
            } => {
                assert_eq!(lower_corner, vec![-10.0, -20.0]);
                assert_eq!(upper_corner, vec![10.0, 20.0]);
                assert_eq!(dimensions, 2);
                assert_eq!(crs.as_deref(), Some("EPSG:4326"));
            }
            other => panic!("expected bounding box, got {:?}", other),
        }
    }

    #[test]
    fn textual_complex_embeds_as_text() {
        let (encoder, _) = encoder();
        let value = output(
            "geometry",
            ProcessData::complex_text("<gml:Point/>", Format::mime("text/xml")),
        );

        match encoder.encode(&value, false).unwrap() {
            OutputElement::ComplexInline { body, .. } => {
                assert_eq!(body, InlineBody::Text("<gml:Point/>".to_string()));
            }
            other => panic!("expected inline complex, got {:?}", other),
        }
    }

    #[test]
    fn binary_complex_embeds_as_base64() {
        let (encoder, _) = encoder();
        let value = output(
            "raster",
            ProcessData::complex_bytes(vec![0, 1, 2, 255], Format::mime("image/tiff")),
        );

        match encoder.encode(&value, false).unwrap() {
            OutputElement::ComplexInline { body, .. } => match body {
                InlineBody::Base64(b64) => {
                    assert_eq!(BASE64.decode(b64).unwrap(), vec![0, 1, 2, 255]);
                }
                other => panic!("expected base64 body, got {:?}", other),
            },
            other => panic!("expected inline complex, got {:?}", other),
        }
    }

    #[test]
    fn reference_output_stores_bytes_and_builds_url() {
        let (encoder, store) = encoder();
        let value = output(
            "raster",
            ProcessData::complex_bytes(vec![7, 8, 9], Format::mime("image/tiff")),
        );

        let element = encoder.encode(&value, true).unwrap();
        match element {
            OutputElement::ComplexReference { href, .. } => {
                assert!(href.starts_with("http://localhost:8080/?service=WPS"));
                assert!(href.contains("request=RetrieveResult"));

                // The stored artifact is retrievable under the id in the URL.
                let id = href.split("id=").nth(1).unwrap();
                let id = urlencoding::decode(id).unwrap();
                let artifact = store.get(&id).unwrap();
                assert_eq!(artifact.bytes, vec![7, 8, 9]);
                assert_eq!(artifact.mime_type, "image/tiff");
            }
            other => panic!("expected reference, got {:?}", other),
        }
        assert_eq!(store.artifact_count(), 1);
    }

    #[test]
    fn missing_generator_is_no_applicable_code() {
        let store = Arc::new(MemoryStore::new());
        let encoder = OutputEncoder::new(GeneratorRegistry::new(), store, "localhost", 8080);
        let value = output(
            "x",
            ProcessData::complex_bytes(vec![1], Format::mime("image/tiff")),
        );

        let err = encoder.encode(&value, false).unwrap_err();
        assert_eq!(err.code(), "NoApplicableCode");
    }

    #[test]
    fn raw_mode_returns_bytes_and_mime() {
        let (encoder, _) = encoder();
        let value = output(
            "raster",
            ProcessData::complex_bytes(vec![5, 6], Format::mime("image/tiff")),
        );

        let (bytes, mime) = encoder.encode_raw(&value).unwrap();
        assert_eq!(bytes, vec![5, 6]);
        assert_eq!(mime, "image/tiff");
    }

    #[test]
    fn raw_mode_literal_is_plain_text() {
        let (encoder, _) = encoder();
        let value = output("n", ProcessData::literal("17"));
        let (bytes, mime) = encoder.encode_raw(&value).unwrap();
        assert_eq!(bytes, b"17");
        assert_eq!(mime, "text/plain");
    }
}
