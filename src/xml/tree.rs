//! Owning XML documents: parsing and serialization

use std::cell::RefCell;
use std::fmt;
use std::io::{BufRead, Cursor};
use std::rc::{Rc, Weak};

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::node::XmlNode;
use crate::error::{Error, Result};

/// Parser configuration
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Keep whitespace-only text between elements. When false, such text is
    /// only kept where `xml:space="preserve"` is in effect (set on the
    /// element or inherited from an ancestor).
    pub keep_blank_text: bool,
    /// Keep comment nodes
    pub keep_comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            keep_blank_text: false,
            keep_comments: true,
        }
    }
}

impl ParseOptions {
    pub fn with_keep_blank_text(mut self, keep: bool) -> Self {
        self.keep_blank_text = keep;
        self
    }

    pub fn with_keep_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }
}

pub(crate) struct DocumentData {
    root: Option<XmlNode>,
}

/// An owning XML tree. Nodes created for it can be linked anywhere inside it.
#[derive(Clone)]
pub struct XmlDocument(Rc<RefCell<DocumentData>>);

impl XmlDocument {
    /// Create an empty document with no root element
    pub fn new() -> Self {
        XmlDocument(Rc::new(RefCell::new(DocumentData { root: None })))
    }

    pub(crate) fn from_rc(inner: Rc<RefCell<DocumentData>>) -> Self {
        XmlDocument(inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<DocumentData>> {
        Rc::downgrade(&self.0)
    }

    /// Whether both handles refer to the same document
    pub fn same_document(&self, other: &XmlDocument) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Root element
    pub fn root(&self) -> Option<XmlNode> {
        self.0.borrow().root.clone()
    }

    /// Install `node` as root element, returning the canonical root.
    /// The previous root (if any) is left detached.
    pub fn set_root(&self, node: XmlNode) -> Result<XmlNode> {
        if !node.is_element() {
            return Err(Error::InvalidOperand(format!(
                "<{}> cannot be a root element",
                node.describe()
            )));
        }
        let node = XmlNode::relocate(node, Some(self));
        self.0.borrow_mut().root = Some(node.clone());
        Ok(node)
    }

    pub(crate) fn release_root(&self, node: &XmlNode) {
        let mut data = self.0.borrow_mut();
        if data.root.as_ref().is_some_and(|root| root.same_node(node)) {
            data.root = None;
        }
    }

    /// Create an unattached element owned by this document
    pub fn create_element(&self, name: &str) -> Result<XmlNode> {
        XmlNode::new_element(name, self)
    }

    /// Create an unattached text node owned by this document
    pub fn create_text(&self, text: impl Into<String>) -> XmlNode {
        XmlNode::new_text(text, self)
    }

    /// Parse with default options
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_with(xml, &ParseOptions::default())
    }

    pub fn parse_with(xml: &str, options: &ParseOptions) -> Result<Self> {
        Self::from_reader(xml.as_bytes(), options)
    }

    /// Parse a complete document from a buffered reader
    pub fn from_reader<R: BufRead>(source: R, options: &ParseOptions) -> Result<Self> {
        let document = XmlDocument::new();
        let mut reader = Reader::from_reader(source);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let root = document.parsed_root(&e)?;
                    let preserve = space_preserved(&root, false);
                    read_children(&mut reader, &root, &document, options, preserve)?;
                }
                Event::Empty(e) => {
                    document.parsed_root(&e)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let Some(root) = document.root() else {
            return Err(Error::InvalidDocument("Missing root element".into()));
        };
        log::debug!(
            "parsed document with root <{}> ({} nodes)",
            root.describe(),
            root.descendants().len() + 1
        );
        Ok(document)
    }

    fn parsed_root(&self, start: &BytesStart) -> Result<XmlNode> {
        if self.root().is_some() {
            return Err(Error::InvalidDocument("Multiple root elements".into()));
        }
        let root = element_from_start(start, self)?;
        self.install_root(root.clone());
        Ok(root)
    }

    /// Set the root to a fresh, unattached element of this document
    pub(crate) fn install_root(&self, root: XmlNode) {
        self.0.borrow_mut().root = Some(root);
    }

    /// Serialize the whole document, including the XML declaration
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some("UTF-8"),
            Some("yes"),
        )))?;
        if let Some(root) = self.root() {
            root.write_to(&mut writer)?;
        }
        String::from_utf8(writer.into_inner().into_inner()).map_err(|e| Error::Utf8(e.utf8_error()))
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDocument")
            .field("root", &self.root())
            .finish()
    }
}

/// Build an unattached element from a start tag
fn element_from_start(start: &BytesStart, document: &XmlDocument) -> Result<XmlNode> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref())?;
    let node = XmlNode::element_unchecked(name, document);
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        node.set_attr(key, value);
    }
    Ok(node)
}

/// `xml:space` in effect on `node`: its own value, else the inherited one
fn space_preserved(node: &XmlNode, inherited: bool) -> bool {
    match node.attr("xml:space").as_deref() {
        Some("preserve") => true,
        Some("default") => false,
        _ => inherited,
    }
}

/// Read children of `parent` up to (and including) its end tag
fn read_children<R: BufRead>(
    reader: &mut Reader<R>,
    parent: &XmlNode,
    document: &XmlDocument,
    options: &ParseOptions,
    preserve: bool,
) -> Result<()> {
    let keep_blank = options.keep_blank_text || preserve;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let child = element_from_start(&e, document)?;
                parent.push_child(child.clone());
                let preserve = space_preserved(&child, preserve);
                read_children(reader, &child, document, options, preserve)?;
            }
            Event::Empty(e) => {
                parent.push_child(element_from_start(&e, document)?);
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if keep_blank || !text.trim().is_empty() {
                    parent.push_child(XmlNode::new_text(text, document));
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).to_string();
                parent.push_child(XmlNode::new_text(text, document));
            }
            Event::Comment(c) => {
                if options.keep_comments {
                    let text = String::from_utf8_lossy(&c).to_string();
                    parent.push_child(XmlNode::new_comment(text, document));
                }
            }
            Event::End(_) => break,
            Event::Eof => return Err(Error::InvalidDocument("Unexpected EOF".into())),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
