//! Minimal namespace-aware XML tree for SVG documents.
//!
//! Elements and attributes keep their qualified names for writing and the
//! resolved namespace plus local name for lookups, so `svg:g` and `g` in the
//! default SVG namespace are the same kind of element.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::NsReader;
use quick_xml::Writer;
use quick_xml::escape::{escape, resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};

use crate::error::{ExportError, Result};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";

/// Element kinds the export engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Circle,
    Ellipse,
    Path,
    Rect,
    Text,
    Group,
    Defs,
    Other,
}

impl ElementKind {
    /// Only elements in the SVG namespace get a specific kind
    pub fn from_name(namespace: Option<&str>, local: &str) -> Self {
        if namespace != Some(SVG_NS) {
            return ElementKind::Other;
        }

        match local {
            "circle" => ElementKind::Circle,
            "ellipse" => ElementKind::Ellipse,
            "path" => ElementKind::Path,
            "rect" => ElementKind::Rect,
            "text" => ElementKind::Text,
            "g" => ElementKind::Group,
            "defs" => ElementKind::Defs,
            _ => ElementKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Qualified name as written, e.g. `inkscape:label`
    pub name: String,
    pub namespace: Option<String>,
    pub local: String,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Escaped character data, written back verbatim
    Text(String),
    Comment(String),
    CData(String),
    /// Raw `<!DOCTYPE ...>` content, including any internal subset
    DocType(String),
    ProcessingInstruction(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub namespace: Option<String>,
    pub local: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        ElementKind::from_name(self.namespace.as_deref(), &self.local)
    }

    /// Value of an attribute without namespace, e.g. `x` or `transform`
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespaced attribute, e.g. (`INKSCAPE_NS`, `label`)
    pub fn attr_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Set an unprefixed attribute, replacing an existing value in place
    pub fn set_attr(&mut self, local: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.namespace.is_none() && a.local == local)
        {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: local.to_string(),
                namespace: None,
                local: local.to_string(),
                value,
            }),
        }
    }

    /// `xmlns` / `xmlns:*` attributes declared on this element
    pub fn namespace_declarations(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.is_namespace_declaration())
    }

    /// Add a namespace declaration unless this element already declares the prefix
    pub fn declare_namespace(&mut self, declaration: &Attribute) {
        if self.attributes.iter().any(|a| a.name == declaration.name) {
            return;
        }
        self.attributes.push(declaration.clone());
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn first_child_element(&self) -> Option<&Element> {
        self.child_elements().next()
    }

    pub fn push_child(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// All descendant elements in document order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        Descendants { stack }
    }
}

/// Pre-order iterator over descendant elements
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(element.child_elements());
        self.stack[start..].reverse();
        Some(element)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Doctype, comments and processing instructions before the root
    pub prolog: Vec<Node>,
    pub root: Element,
}

fn xml_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}

/// General entities declared in a doctype's internal subset
#[derive(Debug, Clone, Default)]
struct Entities {
    declared: HashMap<String, String>,
}

impl Entities {
    /// Collect `<!ENTITY name "value">` declarations; parameter and
    /// external entities are ignored.
    fn from_doctype(doctype: &str) -> Self {
        let mut declared = HashMap::new();
        let mut rest = doctype;

        while let Some(pos) = rest.find("<!ENTITY") {
            rest = rest[pos + "<!ENTITY".len()..].trim_start();
            if rest.starts_with('%') {
                continue;
            }

            let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let name = &rest[..name_end];
            let after = rest[name_end..].trim_start();
            let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                rest = after;
                continue;
            };
            let body = &after[1..];
            let Some(end) = body.find(quote) else {
                break;
            };

            // The first declaration of a name is binding
            declared
                .entry(name.to_string())
                .or_insert_with(|| body[..end].to_string());
            rest = &body[end + 1..];
        }

        Self { declared }
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        self.declared
            .get(name)
            .map(String::as_str)
            .or_else(|| resolve_predefined_entity(name))
    }

    fn unescape<'a>(&self, raw: &'a str) -> Result<Cow<'a, str>> {
        unescape_with(raw, |name| self.resolve(name)).map_err(xml_error)
    }

    /// Escaped text standing in for `&name;` in character data
    fn expand_reference(&self, name: &str) -> Result<String> {
        if name.starts_with('#') || resolve_predefined_entity(name).is_some() {
            return Ok(format!("&{};", name));
        }
        match self.declared.get(name) {
            Some(value) => Ok(escape(value.as_str()).into_owned()),
            None => Err(ExportError::Xml(format!("unrecognized entity `{}`", name))),
        }
    }
}

fn namespace_of(result: ResolveResult<'_>, entities: &Entities) -> Result<Option<String>> {
    match result {
        ResolveResult::Bound(Namespace(ns)) => {
            let raw = String::from_utf8_lossy(ns);
            Ok(Some(entities.unescape(&raw)?.into_owned()))
        }
        _ => Ok(None),
    }
}

fn element_from_start(
    reader: &NsReader<&[u8]>,
    e: &BytesStart<'_>,
    entities: &Entities,
) -> Result<Element> {
    let (ns, local) = reader.resolve_element(e.name());
    let mut element = Element {
        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        namespace: namespace_of(ns, entities)?,
        local: String::from_utf8_lossy(local.as_ref()).into_owned(),
        attributes: Vec::new(),
        children: Vec::new(),
    };

    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        let (ns, local) = reader.resolve_attribute(attr.key);
        let raw = String::from_utf8_lossy(&attr.value);
        let value = entities.unescape(&raw)?;
        element.attributes.push(Attribute {
            name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            namespace: namespace_of(ns, entities)?,
            local: String::from_utf8_lossy(local.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }

    Ok(element)
}

impl Document {
    /// Parse an SVG (or any XML) document
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);

        let mut prolog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut entities = Entities::default();

        // Attach a finished node to the open element, or to the prolog
        fn attach(
            stack: &mut [Element],
            prolog: &mut Vec<Node>,
            root: &Option<Element>,
            node: Node,
        ) {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            } else if root.is_none() && !matches!(node, Node::Text(_)) {
                prolog.push(node);
            }
        }

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(ref e) => {
                    let element = element_from_start(&reader, e, &entities)?;
                    stack.push(element);
                }
                Event::Empty(ref e) => {
                    let element = element_from_start(&reader, e, &entities)?;
                    if !stack.is_empty() {
                        attach(&mut stack, &mut prolog, &root, Node::Element(element));
                    } else if root.is_none() {
                        root = Some(element);
                    } else {
                        return Err(ExportError::Xml(
                            "document has more than one root element".to_string(),
                        ));
                    }
                }
                Event::End(_) => {
                    let Some(element) = stack.pop() else {
                        return Err(ExportError::Xml("unexpected closing tag".to_string()));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(element),
                        None if root.is_none() => root = Some(element),
                        None => {
                            return Err(ExportError::Xml(
                                "document has more than one root element".to_string(),
                            ));
                        }
                    }
                }
                Event::Text(ref e) => {
                    let text = String::from_utf8_lossy(e).into_owned();
                    attach(&mut stack, &mut prolog, &root, Node::Text(text));
                }
                Event::GeneralRef(ref e) => {
                    let text = entities.expand_reference(&String::from_utf8_lossy(e))?;
                    attach(&mut stack, &mut prolog, &root, Node::Text(text));
                }
                Event::CData(ref e) => {
                    let text = String::from_utf8_lossy(e).into_owned();
                    attach(&mut stack, &mut prolog, &root, Node::CData(text));
                }
                Event::Comment(ref e) => {
                    let text = String::from_utf8_lossy(e).into_owned();
                    attach(&mut stack, &mut prolog, &root, Node::Comment(text));
                }
                Event::PI(ref e) => {
                    let text = String::from_utf8_lossy(e).into_owned();
                    attach(
                        &mut stack,
                        &mut prolog,
                        &root,
                        Node::ProcessingInstruction(text),
                    );
                }
                Event::DocType(ref e) => {
                    let text = String::from_utf8_lossy(e).into_owned();
                    entities = Entities::from_doctype(&text);
                    attach(&mut stack, &mut prolog, &root, Node::DocType(text));
                }
                Event::Eof => break,
                // Declaration is regenerated on write
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ExportError::Xml("unexpected end of document".to_string()));
        }

        let root = root.ok_or_else(|| ExportError::Xml("document has no root element".to_string()))?;
        Ok(Document { prolog, root })
    }

    /// Read and parse a document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&xml)
    }

    /// Serialize with an XML declaration
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Text(BytesText::from_escaped("\n")))
            .map_err(xml_error)?;

        for node in &self.prolog {
            write_node(&mut writer, node)?;
            writer
                .write_event(Event::Text(BytesText::from_escaped("\n")))
                .map_err(xml_error)?;
        }
        write_element(&mut writer, &self.root)?;
        writer
            .write_event(Event::Text(BytesText::from_escaped("\n")))
            .map_err(xml_error)?;

        String::from_utf8(writer.into_inner()).map_err(xml_error)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let xml = self.to_xml_string()?;
        fs::write(path, xml).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    let event = match node {
        Node::Element(element) => return write_element(writer, element),
        Node::Text(text) => Event::Text(BytesText::from_escaped(text.as_str())),
        Node::Comment(text) => Event::Comment(BytesText::from_escaped(text.as_str())),
        Node::CData(text) => Event::CData(BytesCData::new(text.as_str())),
        Node::ProcessingInstruction(text) => Event::PI(BytesPI::new(text.as_str())),
        Node::DocType(text) => Event::DocType(BytesText::from_escaped(text.as_str())),
    };
    writer.write_event(event).map_err(xml_error)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for attr in &element.attributes {
        // Tuple conversion escapes the value
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(xml_error)
}
