//! Static process descriptors.

use crate::error::ServiceException;
use crate::format::Format;
use crate::process::data::ProcessData;
use std::collections::HashMap;

/// What kind of data an input or output binds to.
#[derive(Debug, Clone)]
pub enum BindingKind {
    Literal {
        /// XML schema data type, e.g. `xs:double`.
        data_type: Option<String>,
        /// Unit of measure attached to values of this binding.
        uom: Option<String>,
    },
    BoundingBox,
    Complex {
        default_format: Format,
        supported_formats: Vec<Format>,
    },
}

impl BindingKind {
    /// True when a value matches this binding's variant.
    fn accepts(&self, data: &ProcessData) -> bool {
        matches!(
            (self, data),
            (Self::Literal { .. }, ProcessData::Literal(_))
                | (Self::BoundingBox, ProcessData::BoundingBox(_))
                | (Self::Complex { .. }, ProcessData::Complex(_))
        )
    }
}

/// One declared input slot.
#[derive(Debug, Clone)]
pub struct InputDescriptor {
    pub identifier: String,
    pub title: Option<String>,
    pub min_occurs: u32,
    pub max_occurs: u32,
    pub kind: BindingKind,
}

impl InputDescriptor {
    /// A required single-occurrence literal input.
    pub fn literal(identifier: impl Into<String>, data_type: Option<&str>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            min_occurs: 1,
            max_occurs: 1,
            kind: BindingKind::Literal {
                data_type: data_type.map(str::to_string),
                uom: None,
            },
        }
    }

    /// A required single-occurrence complex input.
    pub fn complex(
        identifier: impl Into<String>,
        default_format: Format,
        supported_formats: Vec<Format>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            min_occurs: 1,
            max_occurs: 1,
            kind: BindingKind::Complex {
                default_format,
                supported_formats,
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_occurs(mut self, min: u32, max: u32) -> Self {
        self.min_occurs = min;
        self.max_occurs = max;
        self
    }
}

/// One declared output slot.
#[derive(Debug, Clone)]
pub struct OutputDescriptor {
    pub identifier: String,
    pub title: Option<String>,
    pub kind: BindingKind,
}

impl OutputDescriptor {
    pub fn literal(identifier: impl Into<String>, data_type: Option<&str>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            kind: BindingKind::Literal {
                data_type: data_type.map(str::to_string),
                uom: None,
            },
        }
    }

    pub fn bounding_box(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            kind: BindingKind::BoundingBox,
        }
    }

    pub fn complex(
        identifier: impl Into<String>,
        default_format: Format,
        supported_formats: Vec<Format>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            kind: BindingKind::Complex {
                default_format,
                supported_formats,
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// The static contract of one process: identifier, metadata, and the
/// declared input/output slots with their arity bounds.
#[derive(Debug, Clone)]
pub struct ProcessDescriptor {
    pub identifier: String,
    pub title: String,
    pub abstract_: Option<String>,
    pub version: String,
    pub inputs: Vec<InputDescriptor>,
    pub outputs: Vec<OutputDescriptor>,
}

impl ProcessDescriptor {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            abstract_: None,
            version: "1.0.0".to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_abstract(mut self, abstract_: impl Into<String>) -> Self {
        self.abstract_ = Some(abstract_.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_input(mut self, input: InputDescriptor) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: OutputDescriptor) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn input(&self, identifier: &str) -> Option<&InputDescriptor> {
        self.inputs.iter().find(|i| i.identifier == identifier)
    }

    pub fn output(&self, identifier: &str) -> Option<&OutputDescriptor> {
        self.outputs.iter().find(|o| o.identifier == identifier)
    }

    /// Checks provided inputs against the declared slots: unknown
    /// identifiers, arity bounds, and variant mismatches all fail with
    /// `InvalidParameterValue` or `MissingParameterValue` before any job
    /// is scheduled.
    pub fn validate_inputs(
        &self,
        inputs: &HashMap<String, Vec<ProcessData>>,
    ) -> Result<(), ServiceException> {
        for (identifier, values) in inputs {
            let Some(descriptor) = self.input(identifier) else {
                return Err(ServiceException::invalid_parameter(
                    format!("process {} has no input {}", self.identifier, identifier),
                    "DataInputs",
                ));
            };

            let count = values.len() as u32;
            if count > descriptor.max_occurs {
                return Err(ServiceException::invalid_parameter(
                    format!(
                        "input {} occurs {} times, maximum is {}",
                        identifier, count, descriptor.max_occurs
                    ),
                    identifier.as_str(),
                ));
            }

            if let Some(bad) = values.iter().find(|v| !descriptor.kind.accepts(v)) {
                return Err(ServiceException::invalid_parameter(
                    format!(
                        "input {} does not accept {} data",
                        identifier,
                        variant_name(bad)
                    ),
                    identifier.as_str(),
                ));
            }
        }

        for descriptor in &self.inputs {
            let count = inputs
                .get(&descriptor.identifier)
                .map(|v| v.len() as u32)
                .unwrap_or(0);
            if count < descriptor.min_occurs {
                return Err(ServiceException::missing_parameter(
                    descriptor.identifier.clone(),
                ));
            }
        }

        Ok(())
    }
}

fn variant_name(data: &ProcessData) -> &'static str {
    match data {
        ProcessData::Literal(_) => "literal",
        ProcessData::BoundingBox(_) => "bounding-box",
        ProcessData::Complex(_) => "complex",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ProcessDescriptor {
        ProcessDescriptor::new("test.echo", "Echo")
            .with_input(InputDescriptor::literal("text", Some("xs:string")))
            .with_input(
                InputDescriptor::literal("repeat", Some("xs:int")).with_occurs(0, 3),
            )
            .with_output(OutputDescriptor::literal("result", Some("xs:string")))
    }

    fn one(value: &str) -> Vec<ProcessData> {
        vec![ProcessData::literal(value)]
    }

    #[test]
    fn valid_inputs_pass() {
        let mut inputs = HashMap::new();
        inputs.insert("text".to_string(), one("hello"));
        assert!(descriptor().validate_inputs(&inputs).is_ok());
    }

    #[test]
    fn missing_required_input_fails() {
        let inputs = HashMap::new();
        let err = descriptor().validate_inputs(&inputs).unwrap_err();
        assert_eq!(err.code(), "MissingParameterValue");
        assert_eq!(err.locator(), Some("text"));
    }

    #[test]
    fn unknown_input_fails() {
        let mut inputs = HashMap::new();
        inputs.insert("text".to_string(), one("hello"));
        inputs.insert("bogus".to_string(), one("x"));
        let err = descriptor().validate_inputs(&inputs).unwrap_err();
        assert_eq!(err.code(), "InvalidParameterValue");
    }

    #[test]
    fn arity_upper_bound_is_enforced() {
        let mut inputs = HashMap::new();
        inputs.insert("text".to_string(), one("hello"));
        inputs.insert(
            "repeat".to_string(),
            vec![
                ProcessData::literal("1"),
                ProcessData::literal("2"),
                ProcessData::literal("3"),
                ProcessData::literal("4"),
            ],
        );
        let err = descriptor().validate_inputs(&inputs).unwrap_err();
        assert_eq!(err.code(), "InvalidParameterValue");
        assert_eq!(err.locator(), Some("repeat"));
    }

    #[test]
    fn optional_input_may_be_absent() {
        let mut inputs = HashMap::new();
        inputs.insert("text".to_string(), one("hello"));
        assert!(descriptor().validate_inputs(&inputs).is_ok());
    }

    #[test]
    fn variant_mismatch_fails() {
        let mut inputs = HashMap::new();
        inputs.insert(
            "text".to_string(),
            vec![ProcessData::BoundingBox(crate::process::BoundingBoxData::new(
                vec![0.0],
                vec![1.0],
                None,
            ))],
        );
        let err = descriptor().validate_inputs(&inputs).unwrap_err();
        assert_eq!(err.code(), "InvalidParameterValue");
    }
}
