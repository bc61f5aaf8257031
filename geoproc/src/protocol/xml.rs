//! Minimal XML tree used by the request parsers.
//!
//! Namespace prefixes are stripped on read: elements and attributes are
//! addressed by local name only, which is all the operation parsers
//! need. Schema validation is explicitly out of scope.

use crate::error::ServiceException;
use quick_xml::events::Event;
use quick_xml::Reader;

/// One parsed element: local name, attributes by local name, collected
/// text, and child elements in document order.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Attribute value by local name, case-insensitive.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First child with the given local name, case-insensitive.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// All children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children
            .iter()
            .filter(move |c| c.name.eq_ignore_ascii_case(name))
    }

    /// Trimmed text content of this element.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Trimmed text of a direct child, if present.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(XmlElement::trimmed_text)
    }

    /// True when the element has neither child elements nor text.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.trimmed_text().is_empty()
    }

    /// Re-serializes this element; used to carry embedded XML payloads
    /// through as text. Namespace prefixes were stripped on read, so
    /// this is a structural echo, not a byte-identical one.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&quick_xml::escape::escape(value.as_str()));
            out.push('"');
        }
        if self.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        out.push_str(&quick_xml::escape::escape(self.trimmed_text()));
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn local_name(qualified: &[u8]) -> String {
    let s = String::from_utf8_lossy(qualified);
    match s.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => s.into_owned(),
    }
}

fn malformed(detail: impl std::fmt::Display) -> ServiceException {
    ServiceException::invalid_parameter(format!("malformed XML request: {}", detail), "request")
}

/// Parses a document into its root element.
pub fn parse_document(bytes: &[u8]) -> Result<XmlElement, ServiceException> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    // Stack of open elements; the completed root pops out at the end.
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                let mut element = XmlElement {
                    name: local_name(start.name().as_ref()),
                    ..XmlElement::default()
                };
                for attr in start.attributes() {
                    let attr = attr.map_err(malformed)?;
                    let name = local_name(attr.key.as_ref());
                    if name == "xmlns" || attr.key.as_ref().starts_with(b"xmlns:") {
                        continue;
                    }
                    let value = attr.unescape_value().map_err(malformed)?.into_owned();
                    element.attributes.push((name, value));
                }
                stack.push(element);
            }
            Ok(Event::Empty(start)) => {
                let mut element = XmlElement {
                    name: local_name(start.name().as_ref()),
                    ..XmlElement::default()
                };
                for attr in start.attributes() {
                    let attr = attr.map_err(malformed)?;
                    let name = local_name(attr.key.as_ref());
                    if name == "xmlns" || attr.key.as_ref().starts_with(b"xmlns:") {
                        continue;
                    }
                    let value = attr.unescape_value().map_err(malformed)?.into_owned();
                    element.attributes.push((name, value));
                }
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text.unescape().map_err(malformed)?);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::End(_)) => {
                let finished = stack
                    .pop()
                    .ok_or_else(|| malformed("unbalanced end tag"))?;
                attach(&mut stack, &mut root, finished)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(e)),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(malformed("unterminated element"));
    }
    root.ok_or_else(|| malformed("no root element"))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), ServiceException> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(malformed("multiple root elements"))
    }
}
