//! Minimal namespace-aware element tree over quick-xml.
//!
//! Responses here are small (a handful of feature members), so they are read
//! into a tree once and then queried by local name and namespace.

use ogc_common::DiscoveryError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

/// GML 2/3 namespace.
pub const GML_NS: &str = "http://www.opengis.net/gml";
/// GML 3.2 namespace.
pub const GML_32_NS: &str = "http://www.opengis.net/gml/3.2";

/// Whether a namespace URI is one of the GML namespaces.
pub fn is_gml(namespace: Option<&str>) -> bool {
    matches!(namespace, Some(GML_NS) | Some(GML_32_NS))
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Qualified tag name as written, e.g. `openlayers:teploset`
    pub name: String,
    /// Tag name without prefix
    pub local_name: String,
    /// Resolved namespace URI
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Attribute value by qualified name as written (e.g. `gml:id`).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// All descendant elements (excluding self) in document order.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// First descendant with the given local name, in any namespace.
    pub fn find_local(&self, local_name: &str) -> Option<&XmlElement> {
        self.descendants()
            .into_iter()
            .find(|e| e.local_name == local_name)
    }

    /// First descendant with the given local name in a GML namespace.
    pub fn find_gml(&self, local_name: &str) -> Option<&XmlElement> {
        self.descendants()
            .into_iter()
            .find(|e| e.local_name == local_name && e.is_gml())
    }

    /// Self or any descendant has the given local name.
    pub fn contains_local(&self, local_name: &str) -> bool {
        self.local_name == local_name || self.find_local(local_name).is_some()
    }

    pub fn is_gml(&self) -> bool {
        is_gml(self.namespace.as_deref())
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_descendants<'a>(element: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in element.child_elements() {
        out.push(child);
        collect_descendants(child, out);
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for node in &element.children {
        match node {
            XmlNode::Text(t) => out.push_str(t),
            XmlNode::Element(e) => collect_text(e, out),
        }
    }
}

fn parse_error(reader: &NsReader<&[u8]>, e: impl std::fmt::Display) -> DiscoveryError {
    DiscoveryError::Parse(format!(
        "XML parsing error at position {}: {}",
        reader.buffer_position(),
        e
    ))
}

fn namespace_of(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> Result<XmlElement, DiscoveryError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(reader, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| parse_error(reader, e))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        local_name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        namespace,
        attributes,
        children: Vec::new(),
    })
}

/// Parse a complete document and return its root element.
///
/// Mismatched or unclosed tags, a missing root, and trailing elements after
/// the root are all parse errors.
pub fn parse_document(xml: &str) -> Result<XmlElement, DiscoveryError> {
    let mut reader = NsReader::from_str(xml);
    reader.expand_empty_elements(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let read = reader
            .read_resolved_event()
            .map(|(resolved, event)| (namespace_of(resolved), event));
        let (namespace, event) = match read {
            Ok(v) => v,
            Err(e) => return Err(parse_error(&reader, e)),
        };

        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(parse_error(&reader, "content after the root element"));
                }
                let element = open_element(&reader, namespace, &start)?;
                stack.push(element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| parse_error(&reader, "unbalanced closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| parse_error(&reader, e))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => return Err(parse_error(&reader, "text outside the root element")),
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(parse_error(&reader, "unexpected end of document"));
    }
    root.ok_or_else(|| DiscoveryError::Parse("document has no root element".to_string()))
}
