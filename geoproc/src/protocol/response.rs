//! Response document serialization.
//!
//! All documents are written with namespace prefixes and declarations on
//! the root element. Serialization targets an in-memory buffer, so the
//! writers are infallible by construction.

use crate::encoder::{InlineBody, OutputElement};
use crate::error::ServiceException;
use crate::process::{ProcessData, ProcessDescriptor};
use crate::scheduler::{ExecutionId, OutputRequest, ResponseBody, StatusRenderer};
use crate::{PROTOCOL_VERSION, SERVICE_TYPE};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::Cursor;

const NS_WPS: &str = "http://www.opengis.net/wps/1.0.0";
const NS_OWS: &str = "http://www.opengis.net/ows/1.1";
const NS_XLINK: &str = "http://www.w3.org/1999/xlink";

/// Default language advertised and accepted by the service.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Thin wrapper over the quick-xml writer. The sink is an in-memory
/// vector, where writes cannot fail, so event results are discarded.
struct Doc {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl Doc {
    fn new() -> Self {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let _ = writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)));
        Self { writer }
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) {
        let mut element = BytesStart::new(name);
        for (attr_name, attr_value) in attributes {
            element.push_attribute((*attr_name, *attr_value));
        }
        let _ = self.writer.write_event(Event::Start(element));
    }

    fn end(&mut self, name: &str) {
        let _ = self.writer.write_event(Event::End(BytesEnd::new(name)));
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) {
        let mut element = BytesStart::new(name);
        for (attr_name, attr_value) in attributes {
            element.push_attribute((*attr_name, *attr_value));
        }
        let _ = self.writer.write_event(Event::Empty(element));
    }

    fn text(&mut self, content: &str) {
        let _ = self.writer.write_event(Event::Text(BytesText::new(content)));
    }

    /// Pre-serialized XML written through without re-escaping.
    fn raw(&mut self, xml: &str) {
        let _ = self
            .writer
            .write_event(Event::Text(BytesText::from_escaped(xml)));
    }

    fn leaf(&mut self, name: &str, content: &str) {
        self.start(name, &[]);
        self.text(content);
        self.end(name);
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }
}

// ---------------------------------------------------------------------
// Exception report
// ---------------------------------------------------------------------

/// Renders the protocol's standard error document.
pub fn exception_report(error: &ServiceException) -> Vec<u8> {
    let mut doc = Doc::new();
    doc.start(
        "ows:ExceptionReport",
        &[("xmlns:ows", NS_OWS), ("version", "1.0.0")],
    );
    write_exception(&mut doc, error);
    doc.end("ows:ExceptionReport");
    doc.finish()
}

fn write_exception(doc: &mut Doc, error: &ServiceException) {
    let mut attributes = vec![("exceptionCode", error.code())];
    let locator = error.locator().map(str::to_string);
    if let Some(locator) = &locator {
        attributes.push(("locator", locator.as_str()));
    }
    doc.start("ows:Exception", &attributes);
    doc.leaf("ows:ExceptionText", &error.to_string());

    // Walk the cause chain into additional text elements.
    let mut cause = std::error::Error::source(error);
    while let Some(inner) = cause {
        doc.leaf("ows:ExceptionText", &format!("caused by: {}", inner));
        cause = inner.source();
    }
    doc.end("ows:Exception");
}

// ---------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------

/// Renders the capabilities document from registered descriptors.
pub fn capabilities<'a>(
    service_title: &str,
    descriptors: impl Iterator<Item = &'a ProcessDescriptor>,
) -> Vec<u8> {
    let mut doc = Doc::new();
    doc.start(
        "wps:Capabilities",
        &[
            ("xmlns:wps", NS_WPS),
            ("xmlns:ows", NS_OWS),
            ("service", SERVICE_TYPE),
            ("version", PROTOCOL_VERSION),
            ("xml:lang", DEFAULT_LANGUAGE),
        ],
    );

    doc.start("ows:ServiceIdentification", &[]);
    doc.leaf("ows:Title", service_title);
    doc.leaf("ows:ServiceType", SERVICE_TYPE);
    doc.leaf("ows:ServiceTypeVersion", PROTOCOL_VERSION);
    doc.end("ows:ServiceIdentification");

    doc.start("wps:ProcessOfferings", &[]);
    for descriptor in descriptors {
        doc.start("wps:Process", &[("wps:processVersion", descriptor.version.as_str())]);
        doc.leaf("ows:Identifier", &descriptor.identifier);
        doc.leaf("ows:Title", &descriptor.title);
        if let Some(abstract_) = &descriptor.abstract_ {
            doc.leaf("ows:Abstract", abstract_);
        }
        doc.end("wps:Process");
    }
    doc.end("wps:ProcessOfferings");

    doc.start("wps:Languages", &[]);
    doc.start("wps:Default", &[]);
    doc.leaf("ows:Language", DEFAULT_LANGUAGE);
    doc.end("wps:Default");
    doc.start("wps:Supported", &[]);
    doc.leaf("ows:Language", DEFAULT_LANGUAGE);
    doc.end("wps:Supported");
    doc.end("wps:Languages");

    doc.end("wps:Capabilities");
    doc.finish()
}

// ---------------------------------------------------------------------
// Process descriptions
// ---------------------------------------------------------------------

/// Renders the DescribeProcess response for the given descriptors.
pub fn process_descriptions(descriptors: &[&ProcessDescriptor]) -> Vec<u8> {
    let mut doc = Doc::new();
    doc.start(
        "wps:ProcessDescriptions",
        &[
            ("xmlns:wps", NS_WPS),
            ("xmlns:ows", NS_OWS),
            ("service", SERVICE_TYPE),
            ("version", PROTOCOL_VERSION),
            ("xml:lang", DEFAULT_LANGUAGE),
        ],
    );

    for descriptor in descriptors {
        doc.start(
            "ProcessDescription",
            &[("wps:processVersion", descriptor.version.as_str())],
        );
        doc.leaf("ows:Identifier", &descriptor.identifier);
        doc.leaf("ows:Title", &descriptor.title);
        if let Some(abstract_) = &descriptor.abstract_ {
            doc.leaf("ows:Abstract", abstract_);
        }

        if !descriptor.inputs.is_empty() {
            doc.start("DataInputs", &[]);
            for input in &descriptor.inputs {
                let min = input.min_occurs.to_string();
                let max = input.max_occurs.to_string();
                doc.start(
                    "Input",
                    &[("minOccurs", min.as_str()), ("maxOccurs", max.as_str())],
                );
                doc.leaf("ows:Identifier", &input.identifier);
                if let Some(title) = &input.title {
                    doc.leaf("ows:Title", title);
                }
                write_binding(&mut doc, &input.kind, "LiteralData");
                doc.end("Input");
            }
            doc.end("DataInputs");
        }

        doc.start("ProcessOutputs", &[]);
        for output in &descriptor.outputs {
            doc.start("Output", &[]);
            doc.leaf("ows:Identifier", &output.identifier);
            if let Some(title) = &output.title {
                doc.leaf("ows:Title", title);
            }
            write_binding(&mut doc, &output.kind, "LiteralOutput");
            doc.end("Output");
        }
        doc.end("ProcessOutputs");

        doc.end("ProcessDescription");
    }

    doc.end("wps:ProcessDescriptions");
    doc.finish()
}

fn write_binding(doc: &mut Doc, kind: &crate::process::BindingKind, literal_element: &str) {
    use crate::process::BindingKind;
    match kind {
        BindingKind::Literal { data_type, uom } => {
            doc.start(literal_element, &[]);
            if let Some(data_type) = data_type {
                doc.leaf("ows:DataType", data_type);
            }
            if let Some(uom) = uom {
                doc.start("UOMs", &[]);
                doc.start("Default", &[]);
                doc.leaf("ows:UOM", uom);
                doc.end("Default");
                doc.end("UOMs");
            }
            doc.end(literal_element);
        }
        BindingKind::BoundingBox => {
            doc.empty("BoundingBoxData", &[]);
        }
        BindingKind::Complex {
            default_format,
            supported_formats,
        } => {
            doc.start("ComplexData", &[]);
            doc.start("Default", &[]);
            write_format(doc, default_format);
            doc.end("Default");
            doc.start("Supported", &[]);
            for format in supported_formats {
                write_format(doc, format);
            }
            doc.end("Supported");
            doc.end("ComplexData");
        }
    }
}

fn write_format(doc: &mut Doc, format: &crate::format::Format) {
    doc.start("Format", &[]);
    if let Some(mime_type) = format.mime_type() {
        doc.leaf("MimeType", mime_type);
    }
    if let Some(encoding) = format.encoding() {
        doc.leaf("Encoding", encoding);
    }
    if let Some(schema) = format.schema() {
        doc.leaf("Schema", schema);
    }
    doc.end("Format");
}

// ---------------------------------------------------------------------
// Execute response
// ---------------------------------------------------------------------

/// Which status block the execute response carries.
pub enum ExecutionStatusElement<'a> {
    Accepted,
    Succeeded,
    Failed(&'a ServiceException),
}

/// Request inputs and output definitions echoed back when lineage was
/// requested.
pub struct LineageEcho<'a> {
    pub inputs: &'a HashMap<String, Vec<ProcessData>>,
    pub outputs: &'a [OutputRequest],
}

/// Everything needed to render one execute response document.
pub struct ExecuteResponseParams<'a> {
    pub execution_id: &'a ExecutionId,
    pub process: &'a ProcessDescriptor,
    pub status: ExecutionStatusElement<'a>,
    pub outputs: &'a [OutputElement],
    pub lineage: Option<LineageEcho<'a>>,
    /// URL where the stored status document can be polled.
    pub status_location: Option<&'a str>,
}

/// Renders an execute response document.
pub fn execute_response(params: ExecuteResponseParams<'_>) -> Vec<u8> {
    let mut doc = Doc::new();
    let mut attributes = vec![
        ("xmlns:wps", NS_WPS),
        ("xmlns:ows", NS_OWS),
        ("xmlns:xlink", NS_XLINK),
        ("service", SERVICE_TYPE),
        ("version", PROTOCOL_VERSION),
        ("xml:lang", DEFAULT_LANGUAGE),
    ];
    if let Some(location) = params.status_location {
        attributes.push(("statusLocation", location));
    }
    doc.start("wps:ExecuteResponse", &attributes);

    doc.start(
        "wps:Process",
        &[("wps:processVersion", params.process.version.as_str())],
    );
    doc.leaf("ows:Identifier", &params.process.identifier);
    doc.leaf("ows:Title", &params.process.title);
    doc.end("wps:Process");

    let creation_time = chrono::Utc::now().to_rfc3339();
    doc.start("wps:Status", &[("creationTime", creation_time.as_str())]);
    match params.status {
        ExecutionStatusElement::Accepted => {
            doc.leaf(
                "wps:ProcessAccepted",
                &format!(
                    "Process {} accepted as execution {}",
                    params.process.identifier, params.execution_id
                ),
            );
        }
        ExecutionStatusElement::Succeeded => {
            doc.leaf(
                "wps:ProcessSucceeded",
                &format!("Process {} finished", params.process.identifier),
            );
        }
        ExecutionStatusElement::Failed(error) => {
            doc.start("wps:ProcessFailed", &[]);
            doc.start(
                "ows:ExceptionReport",
                &[("version", "1.0.0")],
            );
            write_exception(&mut doc, error);
            doc.end("ows:ExceptionReport");
            doc.end("wps:ProcessFailed");
        }
    }
    doc.end("wps:Status");

    if let Some(lineage) = &params.lineage {
        write_lineage(&mut doc, lineage);
    }

    if !params.outputs.is_empty() {
        doc.start("wps:ProcessOutputs", &[]);
        for output in params.outputs {
            write_output_element(&mut doc, output);
        }
        doc.end("wps:ProcessOutputs");
    }

    doc.end("wps:ExecuteResponse");
    doc.finish()
}

fn write_lineage(doc: &mut Doc, lineage: &LineageEcho<'_>) {
    doc.start("wps:DataInputs", &[]);
    for (identifier, values) in lineage.inputs {
        for value in values {
            doc.start("wps:Input", &[]);
            doc.leaf("ows:Identifier", identifier);
            doc.start("wps:Data", &[]);
            write_data(doc, value);
            doc.end("wps:Data");
            doc.end("wps:Input");
        }
    }
    doc.end("wps:DataInputs");

    doc.start("wps:OutputDefinitions", &[]);
    for output in lineage.outputs {
        let mut attributes: Vec<(&str, &str)> = Vec::new();
        if output.as_reference {
            attributes.push(("asReference", "true"));
        }
        let mime_type = output.format.mime_type().map(str::to_string);
        if let Some(mime_type) = &mime_type {
            attributes.push(("mimeType", mime_type.as_str()));
        }
        doc.start("wps:Output", &attributes);
        doc.leaf("ows:Identifier", &output.identifier);
        doc.end("wps:Output");
    }
    doc.end("wps:OutputDefinitions");
}

fn write_data(doc: &mut Doc, data: &ProcessData) {
    match data {
        ProcessData::Literal(literal) => {
            let mut attributes: Vec<(&str, &str)> = Vec::new();
            if let Some(data_type) = &literal.data_type {
                attributes.push(("dataType", data_type.as_str()));
            }
            if let Some(uom) = &literal.uom {
                attributes.push(("uom", uom.as_str()));
            }
            doc.start("wps:LiteralData", &attributes);
            doc.text(&literal.value);
            doc.end("wps:LiteralData");
        }
        ProcessData::BoundingBox(bbox) => {
            let dimensions = bbox.dimensions().to_string();
            let mut attributes: Vec<(&str, &str)> =
                vec![("dimensions", dimensions.as_str())];
            if let Some(crs) = &bbox.crs {
                attributes.push(("crs", crs.as_str()));
            }
            doc.start("wps:BoundingBoxData", &attributes);
            doc.leaf("ows:LowerCorner", &join_coords(&bbox.lower_corner));
            doc.leaf("ows:UpperCorner", &join_coords(&bbox.upper_corner));
            doc.end("wps:BoundingBoxData");
        }
        ProcessData::Complex(complex) => {
            let attributes = format_attributes(&complex.format);
            let attribute_refs: Vec<(&str, &str)> = attributes
                .iter()
                .map(|(n, v)| (*n, v.as_str()))
                .collect();
            doc.start("wps:ComplexData", &attribute_refs);
            match &complex.payload {
                crate::process::ComplexPayload::Text(text) => doc.text(text),
                crate::process::ComplexPayload::Bytes(_) => {}
            }
            doc.end("wps:ComplexData");
        }
    }
}

fn write_output_element(doc: &mut Doc, output: &OutputElement) {
    doc.start("wps:Output", &[]);
    match output {
        OutputElement::Literal {
            identifier,
            title,
            value,
            data_type,
            uom,
        } => {
            doc.leaf("ows:Identifier", identifier);
            if let Some(title) = title {
                doc.leaf("ows:Title", title);
            }
            doc.start("wps:Data", &[]);
            let mut attributes: Vec<(&str, &str)> = Vec::new();
            if let Some(data_type) = data_type {
                attributes.push(("dataType", data_type.as_str()));
            }
            if let Some(uom) = uom {
                attributes.push(("uom", uom.as_str()));
            }
            doc.start("wps:LiteralData", &attributes);
            doc.text(value);
            doc.end("wps:LiteralData");
            doc.end("wps:Data");
        }
        OutputElement::BoundingBox {
            identifier,
            title,
            lower_corner,
            upper_corner,
            dimensions,
            crs,
        } => {
            doc.leaf("ows:Identifier", identifier);
            if let Some(title) = title {
                doc.leaf("ows:Title", title);
            }
            doc.start("wps:Data", &[]);
            let dimensions = dimensions.to_string();
            let mut attributes: Vec<(&str, &str)> =
                vec![("dimensions", dimensions.as_str())];
            if let Some(crs) = crs {
                attributes.push(("crs", crs.as_str()));
            }
            doc.start("wps:BoundingBoxData", &attributes);
            doc.leaf("ows:LowerCorner", &join_coords(lower_corner));
            doc.leaf("ows:UpperCorner", &join_coords(upper_corner));
            doc.end("wps:BoundingBoxData");
            doc.end("wps:Data");
        }
        OutputElement::ComplexInline {
            identifier,
            title,
            format,
            body,
        } => {
            doc.leaf("ows:Identifier", identifier);
            if let Some(title) = title {
                doc.leaf("ows:Title", title);
            }
            doc.start("wps:Data", &[]);
            let mut attributes = format_attributes(format);
            if matches!(body, InlineBody::Base64(_)) && format.encoding().is_none() {
                attributes.push(("encoding", "base64".to_string()));
            }
            let attribute_refs: Vec<(&str, &str)> = attributes
                .iter()
                .map(|(n, v)| (*n, v.as_str()))
                .collect();
            doc.start("wps:ComplexData", &attribute_refs);
            match body {
                // Textual content is embedded as a child; it is already
                // well-formed XML or plain text, so it goes through raw.
                InlineBody::Text(text) => doc.raw(text),
                InlineBody::Base64(encoded) => doc.text(encoded),
            }
            doc.end("wps:ComplexData");
            doc.end("wps:Data");
        }
        OutputElement::ComplexReference {
            identifier,
            title,
            format,
            href,
        } => {
            doc.leaf("ows:Identifier", identifier);
            if let Some(title) = title {
                doc.leaf("ows:Title", title);
            }
            let mut attributes = format_attributes(format);
            attributes.push(("xlink:href", href.clone()));
            let attribute_refs: Vec<(&str, &str)> = attributes
                .iter()
                .map(|(n, v)| (*n, v.as_str()))
                .collect();
            doc.empty("wps:Reference", &attribute_refs);
        }
    }
    doc.end("wps:Output");
}

fn format_attributes(format: &crate::format::Format) -> Vec<(&'static str, String)> {
    let mut attributes = Vec::new();
    if let Some(mime_type) = format.mime_type() {
        attributes.push(("mimeType", mime_type.to_string()));
    }
    if let Some(encoding) = format.encoding() {
        attributes.push(("encoding", encoding.to_string()));
    }
    if let Some(schema) = format.schema() {
        attributes.push(("schema", schema.to_string()));
    }
    attributes
}

fn join_coords(coords: &[f64]) -> String {
    coords
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------
// Status renderer wired into the scheduler
// ---------------------------------------------------------------------

/// Renders the documents the scheduler persists on a job's behalf.
pub struct XmlStatusRenderer;

impl StatusRenderer for XmlStatusRenderer {
    fn failed(&self, _execution_id: &ExecutionId, error: &ServiceException) -> ResponseBody {
        ResponseBody::xml(exception_report(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{InputDescriptor, LiteralData, OutputDescriptor};

    fn doc_string(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn exception_report_carries_code_and_locator() {
        let error = ServiceException::invalid_parameter("no such process", "identifier");
        let xml = doc_string(exception_report(&error));
        assert!(xml.contains(r#"exceptionCode="InvalidParameterValue""#));
        assert!(xml.contains(r#"locator="identifier""#));
        assert!(xml.contains("no such process"));
    }

    #[test]
    fn exception_report_includes_cause_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        let error = ServiceException::wrap("fetch failed", io);
        let xml = doc_string(exception_report(&error));
        assert!(xml.contains("caused by: socket closed"));
    }

    #[test]
    fn exception_text_is_escaped() {
        let error = ServiceException::no_applicable_code("bad value: <oops> & more");
        let xml = doc_string(exception_report(&error));
        assert!(xml.contains("&lt;oops&gt; &amp; more"));
    }

    #[test]
    fn capabilities_lists_processes_in_order() {
        let first = ProcessDescriptor::new("first.process", "First");
        let second = ProcessDescriptor::new("second.process", "Second");
        let xml = doc_string(capabilities("Test Server", [&first, &second].into_iter()));

        assert!(xml.contains(r#"service="WPS""#));
        assert!(xml.contains(r#"version="1.0.0""#));
        let first_at = xml.find("first.process").unwrap();
        let second_at = xml.find("second.process").unwrap();
        assert!(first_at < second_at);
    }

    #[test]
    fn process_description_includes_bindings() {
        let descriptor = ProcessDescriptor::new("geo.buffer", "Buffer")
            .with_input(InputDescriptor::literal("distance", Some("xs:double")))
            .with_output(OutputDescriptor::complex(
                "result",
                crate::format::Format::mime("text/xml"),
                vec![crate::format::Format::mime("text/xml")],
            ));
        let xml = doc_string(process_descriptions(&[&descriptor]));
        assert!(xml.contains(r#"minOccurs="1""#));
        assert!(xml.contains("xs:double"));
        assert!(xml.contains("<MimeType>text/xml</MimeType>"));
    }

    fn echo_process() -> ProcessDescriptor {
        ProcessDescriptor::new("test.echo", "Echo")
    }

    #[test]
    fn accepted_response_names_the_execution() {
        let id = ExecutionId::new("exec-1");
        let process = echo_process();
        let xml = doc_string(execute_response(ExecuteResponseParams {
            execution_id: &id,
            process: &process,
            status: ExecutionStatusElement::Accepted,
            outputs: &[],
            lineage: None,
            status_location: Some("http://localhost:8080/?request=RetrieveResult&id=exec-1"),
        }));
        assert!(xml.contains("wps:ProcessAccepted"));
        assert!(xml.contains("exec-1"));
        assert!(xml.contains("statusLocation="));
    }

    #[test]
    fn succeeded_response_embeds_outputs() {
        let id = ExecutionId::new("exec-2");
        let process = echo_process();
        let outputs = vec![OutputElement::Literal {
            identifier: "result".to_string(),
            title: None,
            value: "42".to_string(),
            data_type: Some("xs:int".to_string()),
            uom: None,
        }];
        let xml = doc_string(execute_response(ExecuteResponseParams {
            execution_id: &id,
            process: &process,
            status: ExecutionStatusElement::Succeeded,
            outputs: &outputs,
            lineage: None,
            status_location: None,
        }));
        assert!(xml.contains("wps:ProcessSucceeded"));
        assert!(xml.contains(r#"dataType="xs:int""#));
        assert!(xml.contains(">42</wps:LiteralData>"));
    }

    #[test]
    fn failed_response_embeds_exception_report() {
        let id = ExecutionId::new("exec-3");
        let process = echo_process();
        let error = ServiceException::computation_failed("division by zero");
        let xml = doc_string(execute_response(ExecuteResponseParams {
            execution_id: &id,
            process: &process,
            status: ExecutionStatusElement::Failed(&error),
            outputs: &[],
            lineage: None,
            status_location: None,
        }));
        assert!(xml.contains("wps:ProcessFailed"));
        assert!(xml.contains(r#"exceptionCode="RemoteComputationError""#));
        assert!(xml.contains("division by zero"));
    }

    #[test]
    fn lineage_echoes_inputs_and_output_definitions() {
        let id = ExecutionId::new("exec-4");
        let process = echo_process();
        let mut inputs = HashMap::new();
        inputs.insert(
            "distance".to_string(),
            vec![ProcessData::Literal(LiteralData {
                value: "12.5".to_string(),
                data_type: Some("xs:double".to_string()),
                uom: None,
            })],
        );
        let output_requests = vec![OutputRequest::by_reference("result")];

        let xml = doc_string(execute_response(ExecuteResponseParams {
            execution_id: &id,
            process: &process,
            status: ExecutionStatusElement::Succeeded,
            outputs: &[],
            lineage: Some(LineageEcho {
                inputs: &inputs,
                outputs: &output_requests,
            }),
            status_location: None,
        }));
        assert!(xml.contains("wps:DataInputs"));
        assert!(xml.contains(">12.5</wps:LiteralData>"));
        assert!(xml.contains("wps:OutputDefinitions"));
        assert!(xml.contains(r#"asReference="true""#));
    }

    #[test]
    fn reference_output_is_an_empty_element_with_href() {
        let id = ExecutionId::new("exec-5");
        let process = echo_process();
        let outputs = vec![OutputElement::ComplexReference {
            identifier: "raster".to_string(),
            title: None,
            format: crate::format::Format::mime("image/tiff"),
            href: "http://localhost:8080/?id=abc".to_string(),
        }];
        let xml = doc_string(execute_response(ExecuteResponseParams {
            execution_id: &id,
            process: &process,
            status: ExecutionStatusElement::Succeeded,
            outputs: &outputs,
            lineage: None,
            status_location: None,
        }));
        assert!(xml.contains("<wps:Reference"));
        assert!(xml.contains(r#"mimeType="image/tiff""#));
        assert!(xml.contains(r#"xlink:href="http://localhost:8080/?id=abc""#));
    }

    #[test]
    fn renderer_failure_document_is_an_exception_report() {
        let renderer = XmlStatusRenderer;
        let body = renderer.failed(
            &ExecutionId::new("x"),
            &ServiceException::computation_failed("boom"),
        );
        assert_eq!(body.content_type, "text/xml");
        assert!(String::from_utf8_lossy(&body.bytes).contains("ows:ExceptionReport"));
    }
}
