//! The format triple and permutation builder.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A (mime type, encoding, schema) triple describing one concrete data
/// format. Each component is present or absent; comparison is
/// case-insensitive per component, with absent matching only absent.
///
/// Original casing is preserved for output; only comparison folds case.
#[derive(Debug, Clone, Default)]
pub struct Format {
    mime_type: Option<String>,
    encoding: Option<String>,
    schema: Option<String>,
}

impl Format {
    /// Creates a format from optional components.
    pub fn new(
        mime_type: Option<impl Into<String>>,
        encoding: Option<impl Into<String>>,
        schema: Option<impl Into<String>>,
    ) -> Self {
        Self {
            mime_type: mime_type.map(Into::into),
            encoding: encoding.map(Into::into),
            schema: schema.map(Into::into),
        }
    }

    /// A format with all three axes unspecified.
    pub fn unspecified() -> Self {
        Self::default()
    }

    /// A format pinning only the mime type; a wildcard across the other axes.
    pub fn mime(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            encoding: None,
            schema: None,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// True when no axis is specified.
    pub fn is_unspecified(&self) -> bool {
        self.mime_type.is_none() && self.encoding.is_none() && self.schema.is_none()
    }

    /// Copy of this format with the mime type axis cleared.
    pub fn without_mime_type(&self) -> Self {
        Self {
            mime_type: None,
            ..self.clone()
        }
    }

    /// Copy of this format with the encoding axis cleared.
    pub fn without_encoding(&self) -> Self {
        Self {
            encoding: None,
            ..self.clone()
        }
    }

    /// Copy of this format with the schema axis cleared.
    pub fn without_schema(&self) -> Self {
        Self {
            schema: None,
            ..self.clone()
        }
    }

    /// Wildcard match: every axis this format specifies must match the
    /// candidate case-insensitively; unspecified axes are unconstrained.
    pub fn matches(&self, candidate: &Format) -> bool {
        axis_matches(&self.mime_type, &candidate.mime_type)
            && axis_matches(&self.encoding, &candidate.encoding)
            && axis_matches(&self.schema, &candidate.schema)
    }

    /// True when the mime type marks textual or XML content, which can be
    /// embedded as character data instead of base64.
    pub fn is_textual(&self) -> bool {
        match self.mime_type() {
            Some(m) => {
                let m = m.to_ascii_lowercase();
                m.starts_with("text/")
                    || m.contains("xml")
                    || m.contains("json")
                    || m.ends_with("wkt")
            }
            None => false,
        }
    }
}

fn axis_matches(constraint: &Option<String>, value: &Option<String>) -> bool {
    match constraint {
        None => true,
        Some(c) => match value {
            Some(v) => c.eq_ignore_ascii_case(v),
            None => false,
        },
    }
}

fn axis_eq(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

impl PartialEq for Format {
    fn eq(&self, other: &Self) -> bool {
        axis_eq(&self.mime_type, &other.mime_type)
            && axis_eq(&self.encoding, &other.encoding)
            && axis_eq(&self.schema, &other.schema)
    }
}

impl Eq for Format {}

impl Hash for Format {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for axis in [&self.mime_type, &self.encoding, &self.schema] {
            match axis {
                Some(v) => v.to_ascii_lowercase().hash(state),
                None => 0u8.hash(state),
            }
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.mime_type.as_deref().unwrap_or("*"),
            self.encoding.as_deref().unwrap_or("*"),
            self.schema.as_deref().unwrap_or("*"),
        )
    }
}

/// Cross-product builder for a supported-format set declared as
/// independent per-axis lists.
///
/// An empty axis list is treated as the single absent value, so a
/// permutation over `["image/tiff"]` with no encodings and no schemas
/// yields exactly one format.
#[derive(Debug, Clone, Default)]
pub struct FormatPermutation {
    mime_types: Vec<Option<String>>,
    encodings: Vec<Option<String>>,
    schemas: Vec<Option<String>>,
}

impl FormatPermutation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a supported mime type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_types.push(Some(mime_type.into()));
        self
    }

    /// Adds a supported encoding.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encodings.push(Some(encoding.into()));
        self
    }

    /// Adds a supported schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schemas.push(Some(schema.into()));
        self
    }

    /// Expands the per-axis lists into the full cross-product.
    pub fn formats(&self) -> Vec<Format> {
        let mimes = axis_or_absent(&self.mime_types);
        let encodings = axis_or_absent(&self.encodings);
        let schemas = axis_or_absent(&self.schemas);

        let mut out = Vec::with_capacity(mimes.len() * encodings.len() * schemas.len());
        for m in &mimes {
            for e in &encodings {
                for s in &schemas {
                    out.push(Format {
                        mime_type: m.clone(),
                        encoding: e.clone(),
                        schema: s.clone(),
                    });
                }
            }
        }
        out
    }
}

fn axis_or_absent(values: &[Option<String>]) -> Vec<Option<String>> {
    if values.is_empty() {
        vec![None]
    } else {
        values.to_vec()
    }
}
