//! Generator lookup for complex payloads.
//!
//! A generator turns a complex payload into bytes in a target format.
//! The registry is an explicit ordered list; lookup walks it in
//! registration order and the first generator accepting the
//! (format, payload) pair wins. Failing to find one is a
//! `NoApplicableCode` ("no generator found").

use crate::error::ServiceException;
use crate::format::Format;
use crate::process::ComplexPayload;

/// Produces bytes in a target format from a complex payload.
pub trait Generator: Send + Sync {
    /// Short name for logging and error messages.
    fn name(&self) -> &str;

    /// Whether this generator can produce `format` from `payload`.
    fn supports(&self, format: &Format, payload: &ComplexPayload) -> bool;

    /// Generates the bytes.
    fn generate(
        &self,
        payload: &ComplexPayload,
        format: &Format,
    ) -> Result<Vec<u8>, ServiceException>;
}

/// Ordered generator list.
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn Generator>>,
}

impl GeneratorRegistry {
    /// An empty registry. Most callers want [`GeneratorRegistry::with_builtins`].
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    /// A registry pre-loaded with the pass-through generators for text
    /// and byte payloads.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TextGenerator));
        registry.register(Box::new(BytesGenerator));
        registry
    }

    pub fn register(&mut self, generator: Box<dyn Generator>) {
        self.generators.push(generator);
    }

    /// Finds the first generator supporting the pair, or fails with
    /// `NoApplicableCode`.
    pub fn find(
        &self,
        format: &Format,
        payload: &ComplexPayload,
    ) -> Result<&dyn Generator, ServiceException> {
        self.generators
            .iter()
            .map(AsRef::as_ref)
            .find(|g| g.supports(format, payload))
            .ok_or_else(|| {
                ServiceException::no_applicable_code(format!(
                    "no generator found for {} payload in format {}",
                    payload.kind(),
                    format
                ))
            })
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Emits text payloads as UTF-8 bytes in any declared format.
struct TextGenerator;

impl Generator for TextGenerator {
    fn name(&self) -> &str {
        "text"
    }

    fn supports(&self, _format: &Format, payload: &ComplexPayload) -> bool {
        matches!(payload, ComplexPayload::Text(_))
    }

    fn generate(
        &self,
        payload: &ComplexPayload,
        _format: &Format,
    ) -> Result<Vec<u8>, ServiceException> {
        match payload {
            ComplexPayload::Text(text) => Ok(text.clone().into_bytes()),
            ComplexPayload::Bytes(_) => Err(ServiceException::no_applicable_code(
                "text generator fed a byte payload",
            )),
        }
    }
}

/// Passes byte payloads through unchanged in any declared format.
struct BytesGenerator;

impl Generator for BytesGenerator {
    fn name(&self) -> &str {
        "bytes"
    }

    fn supports(&self, _format: &Format, payload: &ComplexPayload) -> bool {
        matches!(payload, ComplexPayload::Bytes(_))
    }

    fn generate(
        &self,
        payload: &ComplexPayload,
        _format: &Format,
    ) -> Result<Vec<u8>, ServiceException> {
        match payload {
            ComplexPayload::Bytes(bytes) => Ok(bytes.clone()),
            ComplexPayload::Text(_) => Err(ServiceException::no_applicable_code(
                "bytes generator fed a text payload",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_both_payload_kinds() {
        let registry = GeneratorRegistry::with_builtins();
        let format = Format::mime("text/xml");

        let text = ComplexPayload::Text("<a/>".to_string());
        let bytes = ComplexPayload::Bytes(vec![1, 2, 3]);

        assert_eq!(
            registry.find(&format, &text).unwrap().generate(&text, &format).unwrap(),
            b"<a/>"
        );
        assert_eq!(
            registry.find(&format, &bytes).unwrap().generate(&bytes, &format).unwrap(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn empty_registry_reports_no_generator_found() {
        let registry = GeneratorRegistry::new();
        let err = registry
            .find(&Format::mime("image/tiff"), &ComplexPayload::Bytes(vec![]))
            .unwrap_err();
        assert_eq!(err.code(), "NoApplicableCode");
        assert!(format!("{}", err).contains("no generator found"));
    }

    struct PickyGenerator;

    impl Generator for PickyGenerator {
        fn name(&self) -> &str {
            "picky"
        }

        fn supports(&self, format: &Format, _payload: &ComplexPayload) -> bool {
            format.mime_type() == Some("application/special")
        }

        fn generate(
            &self,
            _payload: &ComplexPayload,
            _format: &Format,
        ) -> Result<Vec<u8>, ServiceException> {
            Ok(b"special".to_vec())
        }
    }

    #[test]
    fn registration_order_breaks_ties() {
        let mut registry = GeneratorRegistry::new();
        registry.register(Box::new(PickyGenerator));
        registry.register(Box::new(BytesGenerator));

        let payload = ComplexPayload::Bytes(vec![9]);
        let special = Format::mime("application/special");

        // Picky was registered first and accepts this format.
        let found = registry.find(&special, &payload).unwrap();
        assert_eq!(found.name(), "picky");

        // For other formats the later generic generator serves.
        let other = Format::mime("image/tiff");
        assert_eq!(registry.find(&other, &payload).unwrap().name(), "bytes");
    }
}
