//! Minimal navigable element tree built from `quick-xml` events.
//!
//! Lookups follow the usual soup-style conventions: a query containing a
//! prefix (`dc:title`) matches the qualified name exactly, a bare query
//! (`title`) matches the local name under any prefix. Namespace declarations
//! are kept as ordinary attributes so dialect checks can read them.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::escape::partial_escape;

use crate::clean::{decode_entities, normalize_attribute_markup, normalize_text_markup};
use crate::error::{IngestError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Decoded text plus the markup it re-serializes to. Unknown entity
    /// references survive in both forms exactly as written.
    Text { text: String, markup: String },
}

#[derive(Debug, Clone, PartialEq)]
struct Attribute {
    name: String,
    value: String,
    markup: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

/// A parsed fragment. Owned by the extraction call that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                IngestError::XmlLoad(format!("at position {}: {e}", reader.buffer_position()))
            })?;

            match event {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        IngestError::XmlLoad("closing tag without matching opening tag".into())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(raw) => {
                    let raw = String::from_utf8_lossy(&raw);
                    match stack.last_mut() {
                        Some(parent) => parent.push_text(
                            &decode_entities(&raw),
                            &normalize_text_markup(&raw),
                        ),
                        None if raw.trim().is_empty() => {}
                        None => {
                            return Err(IngestError::XmlLoad(
                                "text content outside the root element".into(),
                            ));
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let data = data.into_inner();
                        let text = String::from_utf8_lossy(&data);
                        parent.push_text(&text, &partial_escape(&*text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(IngestError::XmlLoad(format!("unclosed element <{}>", open.name)));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| IngestError::XmlLoad("document has no root element".into()))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// First element matching `query`, the root included.
    pub fn find(&self, query: &str) -> Option<&Element> {
        if self.root.matches(query) {
            return Some(&self.root);
        }
        self.root.find(query)
    }

    /// Chain of [`Element::find`] lookups, e.g. `record/metadata/oai_dc:dc`.
    pub fn find_path(&self, path: &str) -> Option<&Element> {
        let mut segments = path.split('/');
        let mut current = self.find(segments.next()?)?;
        for segment in segments {
            current = current.find(segment)?;
        }
        Some(current)
    }

    pub fn find_all(&self, query: &str) -> Vec<&Element> {
        std::iter::once(&self.root)
            .chain(self.root.descendants())
            .filter(|element| element.matches(query))
            .collect()
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(IngestError::XmlLoad(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| IngestError::XmlLoad(format!("in <{name}>: {e}")))?;
            let raw = String::from_utf8_lossy(&attr.value);
            attributes.push(Attribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: decode_entities(&raw).into_owned(),
                markup: normalize_attribute_markup(&raw).into_owned(),
            });
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str, markup: &str) {
        if let Some(Node::Text {
            text: last,
            markup: last_markup,
        }) = self.children.last_mut()
        {
            last.push_str(text);
            last_markup.push_str(markup);
        } else {
            self.children.push(Node::Text {
                text: text.to_string(),
                markup: markup.to_string(),
            });
        }
    }

    /// Qualified name as written in the source, prefix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    pub fn matches(&self, query: &str) -> bool {
        if query.contains(':') {
            self.name == query
        } else {
            self.local_name() == query
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whether attribute `name` is present and equal to `value`.
    pub fn attr_is(&self, name: &str, value: &str) -> bool {
        self.attr(name) == Some(value)
    }

    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text { .. } => None,
        })
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.child_elements().rev().collect(),
        }
    }

    /// First descendant matching `query`.
    pub fn find(&self, query: &str) -> Option<&Element> {
        self.descendants().find(|element| element.matches(query))
    }

    pub fn find_all(&self, query: &str) -> Vec<&Element> {
        self.descendants()
            .filter(|element| element.matches(query))
            .collect()
    }

    /// All descendant text concatenated, untouched.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.walk_text(&mut |chunk| out.push_str(chunk));
        out
    }

    /// Trimmed, non-empty descendant text nodes joined with `separator`.
    pub fn text_with_separator(&self, separator: &str) -> String {
        let mut parts = Vec::new();
        self.walk_text(&mut |chunk| {
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                parts.push(chunk.to_string());
            }
        });
        parts.join(separator)
    }

    fn walk_text(&self, visit: &mut dyn FnMut(&str)) {
        for node in &self.children {
            match node {
                Node::Text { text, .. } => visit(text),
                Node::Element(element) => element.walk_text(visit),
            }
        }
    }

    /// Re-serialize this element and its subtree. Text is written back in
    /// its normalized source form, never escaped a second time.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attribute in &self.attributes {
            out.push(' ');
            out.push_str(&attribute.name);
            out.push_str("=\"");
            out.push_str(&attribute.markup);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &self.children {
            match node {
                Node::Text { markup, .. } => out.push_str(markup),
                Node::Element(element) => element.write_xml(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.child_elements().rev());
        Some(next)
    }
}
