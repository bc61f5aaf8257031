//! Request classification and parsing.
//!
//! Three transport shapes feed the same [`ParsedRequest`]: key/value GET
//! parameters, an XML POST body whose root element selects the
//! operation, and a SOAP envelope wrapping that same XML one level
//! deeper. Parsing extracts structure only; cross-field validation
//! (service, version, language) is the dispatcher's job so that it can
//! happen in the order the protocol mandates.

use super::xml::{parse_document, XmlElement};
use crate::error::ServiceException;
use crate::format::Format;
use crate::process::{BoundingBoxData, ComplexData, ComplexPayload, LiteralData, ProcessData};
use crate::resolver::{InputReference, ReferenceMethod};
use crate::scheduler::{OutputRequest, ResponseForm};
use std::collections::HashMap;

/// Raw transport input handed to the dispatcher.
#[derive(Debug, Clone)]
pub enum RawRequest {
    /// Key/value GET parameters. Keys are matched case-insensitively.
    Query(HashMap<String, String>),
    /// An XML POST body, possibly a SOAP envelope.
    Xml(Vec<u8>),
}

impl RawRequest {
    /// Convenience constructor from `(key, value)` pairs.
    pub fn query(pairs: &[(&str, &str)]) -> Self {
        Self::Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// One input value as it appears in the request: inline data or a
/// remote reference still to be resolved.
#[derive(Debug, Clone)]
pub enum InputValue {
    Data(ProcessData),
    Reference(ReferenceValue),
}

/// A remote input reference plus the format attributes declared on it.
#[derive(Debug, Clone)]
pub struct ReferenceValue {
    pub reference: InputReference,
    pub format: Format,
}

/// A parsed Execute request before reference resolution.
#[derive(Debug, Clone)]
pub struct ExecuteContent {
    pub process_id: String,
    pub inputs: HashMap<String, Vec<InputValue>>,
    pub response_form: ResponseForm,
}

/// The operation-specific content of a request.
#[derive(Debug, Clone)]
pub enum OperationRequest {
    GetCapabilities,
    DescribeProcess { identifiers: Vec<String> },
    Execute(ExecuteContent),
    RetrieveResult { id: String },
}

impl OperationRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetCapabilities => "GetCapabilities",
            Self::DescribeProcess { .. } => "DescribeProcess",
            Self::Execute(_) => "Execute",
            Self::RetrieveResult { .. } => "RetrieveResult",
        }
    }
}

/// A classified request with its protocol-level parameters extracted.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub service: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub accept_versions: Vec<String>,
    pub operation: OperationRequest,
}

/// Classifies and parses a raw request.
pub fn parse_request(raw: &RawRequest) -> Result<ParsedRequest, ServiceException> {
    match raw {
        RawRequest::Query(params) => parse_query(params),
        RawRequest::Xml(bytes) => parse_xml(bytes),
    }
}

// ---------------------------------------------------------------------
// Key/value form
// ---------------------------------------------------------------------

struct QueryParams<'a> {
    params: &'a HashMap<String, String>,
}

impl<'a> QueryParams<'a> {
    fn get(&self, name: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    fn flag(&self, name: &str) -> bool {
        self.get(name)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

fn parse_query(params: &HashMap<String, String>) -> Result<ParsedRequest, ServiceException> {
    let query = QueryParams { params };

    let operation_name = query
        .get("request")
        .ok_or_else(|| ServiceException::missing_parameter("request"))?;

    let operation = match operation_name.to_ascii_lowercase().as_str() {
        "getcapabilities" => OperationRequest::GetCapabilities,
        "describeprocess" => {
            let identifiers = query
                .get("identifier")
                .ok_or_else(|| ServiceException::missing_parameter("identifier"))?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            OperationRequest::DescribeProcess { identifiers }
        }
        "execute" => OperationRequest::Execute(parse_query_execute(&query)?),
        "retrieveresult" => {
            let id = query
                .get("id")
                .ok_or_else(|| ServiceException::missing_parameter("id"))?
                .to_string();
            OperationRequest::RetrieveResult { id }
        }
        other => {
            return Err(ServiceException::OperationNotSupported {
                operation: other.to_string(),
            })
        }
    };

    Ok(ParsedRequest {
        service: query.get("service").map(str::to_string),
        version: query.get("version").map(str::to_string),
        language: query.get("language").map(str::to_string),
        accept_versions: query
            .get("acceptversions")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default(),
        operation,
    })
}

fn parse_query_execute(query: &QueryParams<'_>) -> Result<ExecuteContent, ServiceException> {
    let process_id = query
        .get("identifier")
        .ok_or_else(|| ServiceException::missing_parameter("identifier"))?
        .to_string();

    let mut inputs: HashMap<String, Vec<InputValue>> = HashMap::new();
    if let Some(data_inputs) = query.get("datainputs") {
        for token in data_inputs.split(';').filter(|t| !t.trim().is_empty()) {
            let (identifier, value) = parse_kvp_input(token)?;
            inputs.entry(identifier).or_default().push(value);
        }
    }

    let response_form = if let Some(raw_output) = query.get("rawdataoutput") {
        ResponseForm::RawData(parse_kvp_output(raw_output)?)
    } else {
        let outputs = match query.get("responsedocument") {
            Some(spec) => spec
                .split(';')
                .filter(|t| !t.trim().is_empty())
                .map(parse_kvp_output)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        ResponseForm::Document {
            outputs,
            lineage: query.flag("lineage"),
            store_response: query.flag("storeexecuteresponse"),
            status: query.flag("status"),
        }
    };

    Ok(ExecuteContent {
        process_id,
        inputs,
        response_form,
    })
}

/// Splits one `id=value@attr=v@attr=v` token of the compact DataInputs
/// encoding.
fn parse_kvp_input(token: &str) -> Result<(String, InputValue), ServiceException> {
    let token = token.trim();
    let (identifier, rest) = token.split_once('=').ok_or_else(|| {
        ServiceException::invalid_parameter(
            format!("malformed DataInputs entry: {}", token),
            "DataInputs",
        )
    })?;

    let mut parts = rest.split('@');
    let value = parts.next().unwrap_or_default().to_string();

    let mut mime_type = None;
    let mut encoding = None;
    let mut schema = None;
    let mut href = None;
    let mut data_type = None;
    let mut uom = None;
    for attr in parts {
        let Some((name, attr_value)) = attr.split_once('=') else {
            continue;
        };
        let name = name.strip_prefix("xlink:").unwrap_or(name);
        let attr_value = attr_value.to_string();
        match name.to_ascii_lowercase().as_str() {
            "mimetype" => mime_type = Some(attr_value),
            "encoding" => encoding = Some(attr_value),
            "schema" => schema = Some(attr_value),
            "href" => href = Some(attr_value),
            "datatype" => data_type = Some(attr_value),
            "uom" => uom = Some(attr_value),
            _ => {}
        }
    }

    let format = Format::new(mime_type.clone(), encoding, schema);
    let value = if let Some(href) = href {
        InputValue::Reference(ReferenceValue {
            reference: InputReference {
                href,
                mime_type,
                ..InputReference::default()
            },
            format,
        })
    } else if format.is_unspecified() {
        InputValue::Data(ProcessData::Literal(LiteralData {
            value,
            data_type,
            uom,
        }))
    } else {
        InputValue::Data(ProcessData::Complex(ComplexData {
            payload: ComplexPayload::Text(value),
            format,
        }))
    };

    Ok((identifier.trim().to_string(), value))
}

/// Parses one output token of `ResponseDocument`/`RawDataOutput`.
fn parse_kvp_output(token: &str) -> Result<OutputRequest, ServiceException> {
    let token = token.trim();
    let mut parts = token.split('@');
    let identifier = parts.next().unwrap_or_default().trim().to_string();
    if identifier.is_empty() {
        return Err(ServiceException::invalid_parameter(
            "empty output identifier",
            "ResponseDocument",
        ));
    }

    let mut request = OutputRequest::inline(identifier);
    let mut mime_type = None;
    let mut encoding = None;
    let mut schema = None;
    for attr in parts {
        let Some((name, value)) = attr.split_once('=') else {
            continue;
        };
        match name.to_ascii_lowercase().as_str() {
            "mimetype" => mime_type = Some(value.to_string()),
            "encoding" => encoding = Some(value.to_string()),
            "schema" => schema = Some(value.to_string()),
            "asreference" => request.as_reference = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }
    request.format = Format::new(mime_type, encoding, schema);
    Ok(request)
}

// ---------------------------------------------------------------------
// XML form (plus the SOAP wrapper)
// ---------------------------------------------------------------------

fn parse_xml(bytes: &[u8]) -> Result<ParsedRequest, ServiceException> {
    let mut root = parse_document(bytes)?;

    // A SOAP envelope carries the operation one level deeper.
    if root.name.eq_ignore_ascii_case("Envelope") {
        let body = root
            .child("Body")
            .ok_or_else(|| {
                ServiceException::invalid_parameter("SOAP envelope without a Body", "request")
            })?
            .clone();
        root = body.children.into_iter().next().ok_or_else(|| {
            ServiceException::invalid_parameter("SOAP body is empty", "request")
        })?;
    }

    let service = root.attr("service").map(str::to_string);
    let version = root.attr("version").map(str::to_string);
    let language = root.attr("language").map(str::to_string);

    let operation = match root.name.to_ascii_lowercase().as_str() {
        "getcapabilities" => OperationRequest::GetCapabilities,
        "describeprocess" => OperationRequest::DescribeProcess {
            identifiers: root
                .children_named("Identifier")
                .map(|c| c.trimmed_text().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        },
        "execute" => OperationRequest::Execute(parse_xml_execute(&root)?),
        other => {
            return Err(ServiceException::OperationNotSupported {
                operation: other.to_string(),
            })
        }
    };

    let accept_versions = root
        .child("AcceptVersions")
        .map(|av| {
            av.children_named("Version")
                .map(|v| v.trimmed_text().to_string())
                .collect()
        })
        .unwrap_or_default();

    Ok(ParsedRequest {
        service,
        version,
        language,
        accept_versions,
        operation,
    })
}

fn parse_xml_execute(root: &XmlElement) -> Result<ExecuteContent, ServiceException> {
    let process_id = root
        .child_text("Identifier")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceException::missing_parameter("Identifier"))?
        .to_string();

    let mut inputs: HashMap<String, Vec<InputValue>> = HashMap::new();
    if let Some(data_inputs) = root.child("DataInputs") {
        for input in data_inputs.children_named("Input") {
            let identifier = input
                .child_text("Identifier")
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ServiceException::missing_parameter("Input/Identifier"))?
                .to_string();
            let value = parse_xml_input_value(&identifier, input)?;
            inputs.entry(identifier).or_default().push(value);
        }
    }

    let response_form = match root.child("ResponseForm") {
        None => ResponseForm::default_document(),
        Some(form) => {
            if let Some(raw) = form.child("RawDataOutput") {
                ResponseForm::RawData(parse_xml_output(raw)?)
            } else if let Some(doc) = form.child("ResponseDocument") {
                let outputs = doc
                    .children_named("Output")
                    .map(parse_xml_output)
                    .collect::<Result<Vec<_>, _>>()?;
                ResponseForm::Document {
                    outputs,
                    lineage: bool_attr(doc, "lineage"),
                    store_response: bool_attr(doc, "storeExecuteResponse"),
                    status: bool_attr(doc, "status"),
                }
            } else {
                ResponseForm::default_document()
            }
        }
    };

    Ok(ExecuteContent {
        process_id,
        inputs,
        response_form,
    })
}

fn bool_attr(element: &XmlElement, name: &str) -> bool {
    element
        .attr(name)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn format_from_attrs(element: &XmlElement) -> Format {
    Format::new(
        element.attr("mimeType").map(str::to_string),
        element.attr("encoding").map(str::to_string),
        element.attr("schema").map(str::to_string),
    )
}

fn parse_xml_input_value(
    identifier: &str,
    input: &XmlElement,
) -> Result<InputValue, ServiceException> {
    if let Some(reference) = input.child("Reference") {
        return parse_xml_reference(identifier, reference).map(InputValue::Reference);
    }

    let data = input.child("Data").ok_or_else(|| {
        ServiceException::invalid_parameter(
            format!("input {} carries neither Data nor Reference", identifier),
            identifier,
        )
    })?;

    if let Some(literal) = data.child("LiteralData") {
        return Ok(InputValue::Data(ProcessData::Literal(LiteralData {
            value: literal.trimmed_text().to_string(),
            data_type: literal.attr("dataType").map(str::to_string),
            uom: literal.attr("uom").map(str::to_string),
        })));
    }

    if let Some(bbox) = data.child("BoundingBoxData") {
        let lower = parse_corner(identifier, bbox.child_text("LowerCorner"))?;
        let upper = parse_corner(identifier, bbox.child_text("UpperCorner"))?;
        return Ok(InputValue::Data(ProcessData::BoundingBox(
            BoundingBoxData::new(lower, upper, bbox.attr("crs").map(str::to_string)),
        )));
    }

    if let Some(complex) = data.child("ComplexData") {
        // Embedded XML children are carried through re-serialized; plain
        // character content is taken as-is.
        let content = if complex.children.is_empty() {
            complex.trimmed_text().to_string()
        } else {
            complex
                .children
                .iter()
                .map(XmlElement::to_xml)
                .collect::<String>()
        };
        return Ok(InputValue::Data(ProcessData::Complex(ComplexData {
            payload: ComplexPayload::Text(content),
            format: format_from_attrs(complex),
        })));
    }

    Err(ServiceException::invalid_parameter(
        format!("input {} has an empty Data element", identifier),
        identifier,
    ))
}

fn parse_corner(identifier: &str, text: Option<&str>) -> Result<Vec<f64>, ServiceException> {
    let text = text.ok_or_else(|| {
        ServiceException::invalid_parameter(
            format!("bounding box input {} is missing a corner", identifier),
            identifier,
        )
    })?;
    text.split_whitespace()
        .map(|c| {
            c.parse::<f64>().map_err(|_| {
                ServiceException::invalid_parameter(
                    format!("bounding box corner has a non-numeric ordinate: {}", c),
                    identifier,
                )
            })
        })
        .collect()
}

fn parse_xml_reference(
    identifier: &str,
    element: &XmlElement,
) -> Result<ReferenceValue, ServiceException> {
    let href = element
        .attr("href")
        .filter(|h| !h.is_empty())
        .ok_or_else(|| {
            ServiceException::invalid_parameter(
                format!("reference input {} has no href", identifier),
                identifier,
            )
        })?
        .to_string();

    let method = match element.attr("method") {
        Some(m) if m.eq_ignore_ascii_case("post") => ReferenceMethod::Post,
        _ => ReferenceMethod::Get,
    };

    let headers = element
        .children_named("Header")
        .filter_map(|h| match (h.attr("key"), h.attr("value")) {
            (Some(k), Some(v)) => Some((k.to_string(), v.to_string())),
            _ => None,
        })
        .collect();

    let body = element.child("Body").map(|b| {
        if b.children.is_empty() {
            b.trimmed_text().to_string()
        } else {
            b.children.iter().map(XmlElement::to_xml).collect()
        }
    });
    let body_reference = element
        .child("BodyReference")
        .and_then(|b| b.attr("href"))
        .map(str::to_string);

    let format = format_from_attrs(element);
    Ok(ReferenceValue {
        reference: InputReference {
            href,
            method,
            headers,
            body,
            body_reference,
            mime_type: format.mime_type().map(str::to_string),
        },
        format,
    })
}
