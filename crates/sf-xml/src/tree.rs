//! A small immutable element tree built from `quick-xml` events.
//!
//! The tree keeps every child node kind the reader reports, so the decoder can
//! reject payloads it does not understand instead of silently dropping them.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{Result, XmlError};
use crate::XSI_NAMESPACE;

/// A child node of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Character data (text or CDATA), already unescaped.
    Text(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// An attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub qualified_name: String,
    pub local_name: String,
    pub namespace: Option<String>,
    pub value: String,
}

/// An element with its resolved namespace, attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub qualified_name: String,
    pub local_name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Look up an attribute by namespace URI and local name.
    pub fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local_name && a.namespace.as_deref() == Some(namespace))
            .map(|a| a.value.as_str())
    }

    /// Look up an XML Schema-Instance attribute (`nil`, `type`).
    pub fn xsi_attribute(&self, local_name: &str) -> Option<&str> {
        self.attribute_ns(XSI_NAMESPACE, local_name)
    }

    /// Iterate over element children.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Depth-first search (document order) for the first element with the
    /// given local name, including `self`.
    pub fn find(&self, local_name: &str) -> Option<&XmlElement> {
        if self.local_name == local_name {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(local_name))
    }

    /// Concatenated character data of this element and all descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Text(text) => out.push_str(text),
            XmlNode::Element(inner) => collect_text(inner, out),
            _ => {}
        }
    }
}

/// Parse a document and return its root element.
pub fn parse(xml: &str) -> Result<XmlElement> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlError::Parse(format!("at byte {}: {e}", reader.buffer_position())))?;

        match event {
            Event::Start(start) => {
                let element = element_from_start(&reader, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from_start(&reader, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::Parse("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| XmlError::Parse(e.to_string()))?;
                    parent.children.push(XmlNode::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&comment).into_owned();
                    parent.children.push(XmlNode::Comment(text));
                }
            }
            Event::PI(pi) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&pi).into_owned();
                    parent.children.push(XmlNode::ProcessingInstruction(text));
                }
            }
            Event::Eof => break,
            // Declarations and doctypes carry nothing the codec needs.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Parse("unexpected end of document".to_string()));
    }
    root.ok_or(XmlError::MissingRoot)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlError::Parse("multiple root elements".to_string())),
    }
    Ok(())
}

fn element_from_start(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlElement> {
    let (ns, local) = reader.resolve_element(start.name());

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Parse(e.to_string()))?;
        let qualified_name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if qualified_name == "xmlns" || qualified_name.starts_with("xmlns:") {
            continue;
        }
        let (attr_ns, attr_local) = reader.resolve_attribute(attr.key);
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Parse(e.to_string()))?
            .into_owned();
        attributes.push(XmlAttribute {
            qualified_name,
            local_name: String::from_utf8_lossy(attr_local.as_ref()).into_owned(),
            namespace: bound_namespace(attr_ns),
            value,
        });
    }

    Ok(XmlElement {
        qualified_name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        local_name: String::from_utf8_lossy(local.as_ref()).into_owned(),
        namespace: bound_namespace(ns),
        attributes,
        children: Vec::new(),
    })
}

fn bound_namespace(result: ResolveResult<'_>) -> Option<String> {
    match result {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}
