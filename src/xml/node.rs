//! Shared XML node handles
//!
//! An [`XmlNode`] is a cheap, clonable handle onto one node of a mutable
//! tree. Children are owned by their parent; the parent link and the owning
//! [`XmlDocument`] are held weakly, so dropping a handle never detaches
//! anything from the tree.

use std::cell::RefCell;
use std::fmt;
use std::io::Cursor;
use std::rc::{Rc, Weak};

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::path;
use super::tree::{DocumentData, XmlDocument};
use crate::error::{Error, Result};

type NodeRef = Rc<RefCell<NodeData>>;

/// What a node holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Element with its qualified name (e.g. "w:p") and ordered attributes
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// Text node
    Text(String),
    /// Comment node
    Comment(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<XmlNode>,
    document: Weak<RefCell<DocumentData>>,
}

/// Handle to a node in a shared XML tree.
///
/// Equality is node identity, not structural equality.
#[derive(Clone)]
pub struct XmlNode(NodeRef);

impl XmlNode {
    fn with_kind(kind: NodeKind, document: Weak<RefCell<DocumentData>>) -> Self {
        XmlNode(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
            document,
        })))
    }

    /// Create a new, unattached element owned by `document`.
    ///
    /// Fails with [`Error::InvalidTag`] if `name` is not a valid XML name.
    pub fn new_element(name: &str, document: &XmlDocument) -> Result<Self> {
        if !is_valid_name(name) {
            return Err(Error::InvalidTag(name.to_string()));
        }
        Ok(Self::element_unchecked(name, document))
    }

    pub(crate) fn element_unchecked(name: &str, document: &XmlDocument) -> Self {
        Self::with_kind(
            NodeKind::Element {
                name: name.to_string(),
                attributes: Vec::new(),
            },
            document.downgrade(),
        )
    }

    /// Create a new, unattached text node owned by `document`
    pub fn new_text(text: impl Into<String>, document: &XmlDocument) -> Self {
        Self::with_kind(NodeKind::Text(text.into()), document.downgrade())
    }

    /// Create a new, unattached comment node owned by `document`
    pub fn new_comment(text: impl Into<String>, document: &XmlDocument) -> Self {
        Self::with_kind(NodeKind::Comment(text.into()), document.downgrade())
    }

    /// Whether both handles point at the same node
    pub fn same_node(&self, other: &XmlNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Snapshot of the node's kind
    pub fn kind(&self) -> NodeKind {
        self.0.borrow().kind.clone()
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Text(_))
    }

    /// Qualified element name, `None` for text and comments
    pub fn name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    /// Whether this is an element with the given qualified name
    pub fn has_name(&self, qualified: &str) -> bool {
        match &self.0.borrow().kind {
            NodeKind::Element { name, .. } => name == qualified,
            _ => false,
        }
    }

    /// Element name without its prefix
    pub fn local_name(&self) -> Option<String> {
        self.name()
            .map(|name| match name.split_once(':') {
                Some((_, local)) => local.to_string(),
                None => name,
            })
    }

    /// The document owning this node, if it is still alive
    pub fn document(&self) -> Option<XmlDocument> {
        self.0.borrow().document.upgrade().map(XmlDocument::from_rc)
    }

    // ---- attributes ----

    /// Get an attribute value by qualified name
    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    /// All attributes in document order
    pub fn attributes(&self) -> Vec<(String, String)> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes.clone(),
            _ => Vec::new(),
        }
    }

    /// Set an attribute, replacing an existing value in place.
    /// Ignored on non-element nodes.
    pub fn set_attr(&self, name: &str, value: impl Into<String>) {
        if let NodeKind::Element { attributes, .. } = &mut self.0.borrow_mut().kind {
            let value = value.into();
            match attributes.iter_mut().find(|(key, _)| key == name) {
                Some(existing) => existing.1 = value,
                None => attributes.push((name.to_string(), value)),
            }
        }
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&self, name: &str) -> Option<String> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element { attributes, .. } => {
                let index = attributes.iter().position(|(key, _)| key == name)?;
                Some(attributes.remove(index).1)
            }
            _ => None,
        }
    }

    // ---- navigation ----

    pub fn parent(&self) -> Option<XmlNode> {
        self.0.borrow().parent.upgrade().map(XmlNode)
    }

    pub fn children(&self) -> Vec<XmlNode> {
        self.0.borrow().children.clone()
    }

    /// Child elements, skipping text and comments
    pub fn element_children(&self) -> Vec<XmlNode> {
        self.0
            .borrow()
            .children
            .iter()
            .filter(|c| c.is_element())
            .cloned()
            .collect()
    }

    /// First child element with the given qualified name
    pub fn child_element(&self, name: &str) -> Option<XmlNode> {
        self.0
            .borrow()
            .children
            .iter()
            .find(|c| c.has_name(name))
            .cloned()
    }

    pub fn first_element_child(&self) -> Option<XmlNode> {
        self.0
            .borrow()
            .children
            .iter()
            .find(|c| c.is_element())
            .cloned()
    }

    pub fn first_child(&self) -> Option<XmlNode> {
        self.0.borrow().children.first().cloned()
    }

    pub fn last_child(&self) -> Option<XmlNode> {
        self.0.borrow().children.last().cloned()
    }

    /// Position among the parent's children
    pub fn index(&self) -> Option<usize> {
        let parent = self.parent()?;
        let data = parent.0.borrow();
        data.children.iter().position(|c| c.same_node(self))
    }

    pub fn next_sibling(&self) -> Option<XmlNode> {
        let parent = self.parent()?;
        let index = self.index()?;
        let data = parent.0.borrow();
        data.children.get(index + 1).cloned()
    }

    pub fn previous_sibling(&self) -> Option<XmlNode> {
        let parent = self.parent()?;
        let index = self.index()?;
        let data = parent.0.borrow();
        index.checked_sub(1).and_then(|i| data.children.get(i).cloned())
    }

    /// Siblings after this node, in document order
    pub fn following_siblings(&self) -> Vec<XmlNode> {
        match (self.parent(), self.index()) {
            (Some(parent), Some(index)) => parent.0.borrow().children[index + 1..].to_vec(),
            _ => Vec::new(),
        }
    }

    /// Siblings before this node, in document order
    pub fn preceding_siblings(&self) -> Vec<XmlNode> {
        match (self.parent(), self.index()) {
            (Some(parent), Some(index)) => parent.0.borrow().children[..index].to_vec(),
            _ => Vec::new(),
        }
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self) -> Vec<XmlNode> {
        let mut result = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            result.push(node);
        }
        result
    }

    /// Descendants in document order, excluding this node
    pub fn descendants(&self) -> Vec<XmlNode> {
        let mut result = Vec::new();
        self.collect_descendants(&mut result);
        result
    }

    fn collect_descendants(&self, out: &mut Vec<XmlNode>) {
        for child in self.0.borrow().children.iter() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    /// Nearest ancestor element, optionally restricted to a qualified name.
    ///
    /// `None` or `Some("*")` accepts any element.
    pub fn nearest_ancestor(&self, filter: Option<&str>) -> Option<XmlNode> {
        self.ancestors().into_iter().find(|node| match filter {
            None | Some("*") => node.is_element(),
            Some(name) => node.has_name(name),
        })
    }

    /// The structural-properties child (`w:p` -> `w:pPr`, `w:r` -> `w:rPr`, ...)
    pub fn properties(&self) -> Option<XmlNode> {
        let name = self.name()?;
        self.child_element(&format!("{name}Pr"))
    }

    /// Evaluate an XPath 1.0 expression with this node as context; elements,
    /// text and comments selected by it come back in document order
    pub fn xpath(&self, expr: &str) -> Result<Vec<XmlNode>> {
        path::select(self, expr)
    }

    /// First match of an XPath expression
    pub fn at_xpath(&self, expr: &str) -> Result<Option<XmlNode>> {
        Ok(self.xpath(expr)?.into_iter().next())
    }

    // ---- content ----

    /// Concatenated text of this node and all descendants
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &data.children {
                    child.collect_text(out);
                }
            }
            NodeKind::Comment(_) => {}
        }
    }

    /// Replace content: elements lose all children for a single text node,
    /// text and comment nodes get their value replaced.
    pub fn set_content(&self, text: &str) {
        let document = self.0.borrow().document.clone();
        let mut guard = self.0.borrow_mut();
        let data = &mut *guard;
        match &mut data.kind {
            NodeKind::Text(value) | NodeKind::Comment(value) => *value = text.to_string(),
            NodeKind::Element { .. } => {
                for child in data.children.drain(..) {
                    child.0.borrow_mut().parent = Weak::new();
                }
                if !text.is_empty() {
                    let node = XmlNode::with_kind(NodeKind::Text(text.to_string()), document);
                    node.0.borrow_mut().parent = Rc::downgrade(&self.0);
                    data.children.push(node);
                }
            }
        }
    }

    // ---- mutation ----

    /// Attach `node` as the last child, returning the canonical attached node
    pub fn add_child(&self, node: XmlNode) -> Result<XmlNode> {
        self.link_at(node, |children| children.len())
    }

    /// Attach `node` at `index` among the children (clamped to the end)
    pub fn insert_child(&self, index: usize, node: XmlNode) -> Result<XmlNode> {
        self.link_at(node, |_| index)
    }

    /// Attach `node` right after this node, under this node's parent
    pub fn add_next_sibling(&self, node: XmlNode) -> Result<XmlNode> {
        let parent = self.sibling_parent(&node)?;
        let anchor = self.clone();
        parent.link_at(node, move |children| {
            children
                .iter()
                .position(|c| c.same_node(&anchor))
                .map_or(children.len(), |i| i + 1)
        })
    }

    /// Attach `node` right before this node, under this node's parent
    pub fn add_previous_sibling(&self, node: XmlNode) -> Result<XmlNode> {
        let parent = self.sibling_parent(&node)?;
        let anchor = self.clone();
        parent.link_at(node, move |children| {
            children
                .iter()
                .position(|c| c.same_node(&anchor))
                .unwrap_or(0)
        })
    }

    fn sibling_parent(&self, node: &XmlNode) -> Result<XmlNode> {
        if node.same_node(self) {
            return Err(Error::InvalidOperand(format!(
                "cannot place <{}> next to itself",
                self.describe()
            )));
        }
        self.parent().ok_or_else(|| {
            Error::InvalidOperand(format!("<{}> has no parent to insert into", self.describe()))
        })
    }

    /// Detach from the parent. The node stays alive as long as it is referenced.
    pub fn unlink(&self) {
        match self.parent() {
            Some(parent) => {
                parent
                    .0
                    .borrow_mut()
                    .children
                    .retain(|c| !c.same_node(self));
                self.0.borrow_mut().parent = Weak::new();
            }
            None => {
                if let Some(document) = self.document() {
                    document.release_root(self);
                }
            }
        }
    }

    /// Remove this node from its tree
    pub fn remove(&self) {
        log::debug!("removing <{}>", self.describe());
        self.unlink();
    }

    /// Deep copy owned by the same document, not attached anywhere
    pub fn duplicate(&self) -> XmlNode {
        let document = self.0.borrow().document.clone();
        self.duplicate_with(&document)
    }

    fn duplicate_with(&self, document: &Weak<RefCell<DocumentData>>) -> XmlNode {
        let data = self.0.borrow();
        let copy = XmlNode::with_kind(data.kind.clone(), document.clone());
        let children: Vec<XmlNode> = data
            .children
            .iter()
            .map(|child| {
                let child = child.duplicate_with(document);
                child.0.borrow_mut().parent = Rc::downgrade(&copy.0);
                child
            })
            .collect();
        copy.0.borrow_mut().children = children;
        copy
    }

    fn set_document(&self, document: &Weak<RefCell<DocumentData>>) {
        let mut data = self.0.borrow_mut();
        data.document = document.clone();
        for child in &data.children {
            child.set_document(document);
        }
    }

    /// Make `node` ready to be linked into `document`: a node from another
    /// live document is replaced by a deep copy, anything else is unlinked.
    pub(crate) fn relocate(node: XmlNode, document: Option<&XmlDocument>) -> XmlNode {
        let Some(target) = document else {
            node.unlink();
            return node;
        };
        match node.document() {
            Some(source) if !source.same_document(target) => {
                log::debug!("importing <{}> from another document", node.describe());
                node.duplicate_with(&target.downgrade())
            }
            Some(_) => {
                node.unlink();
                node
            }
            None => {
                node.unlink();
                node.set_document(&target.downgrade());
                node
            }
        }
    }

    fn link_at<F>(&self, node: XmlNode, position: F) -> Result<XmlNode>
    where
        F: FnOnce(&[XmlNode]) -> usize,
    {
        if !self.is_element() {
            return Err(Error::InvalidOperand(format!(
                "<{}> cannot hold children",
                self.describe()
            )));
        }
        if node.same_node(self) || self.ancestors().iter().any(|a| a.same_node(&node)) {
            return Err(Error::HierarchyRequest {
                node: node.describe(),
            });
        }

        let node = Self::relocate(node, self.document().as_ref());

        let mut data = self.0.borrow_mut();
        let index = position(&data.children).min(data.children.len());
        node.0.borrow_mut().parent = Rc::downgrade(&self.0);
        data.children.insert(index, node.clone());
        log::debug!(
            "linked <{}> into <{}> at {}",
            node.describe(),
            describe_kind(&data.kind),
            index
        );
        Ok(node)
    }

    /// Append a freshly built child without relinking checks (parser use)
    pub(crate) fn push_child(&self, child: XmlNode) {
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child);
    }

    /// Short label for logs and errors
    pub fn describe(&self) -> String {
        match self.0.try_borrow() {
            Ok(data) => describe_kind(&data.kind),
            Err(_) => "?".to_string(),
        }
    }

    // ---- serialization ----

    /// Write this subtree to an XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Element { name, attributes } => {
                let mut start = BytesStart::new(name.as_str());
                for (key, value) in attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }
                if data.children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for child in &data.children {
                        child.write_to(writer)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
                }
            }
            NodeKind::Text(text) => {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            NodeKind::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
        }
        Ok(())
    }

    /// Serialize this subtree to a string
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner().into_inner()).map_err(|e| Error::Utf8(e.utf8_error()))
    }
}

impl PartialEq for XmlNode {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl Eq for XmlNode {}

impl fmt::Debug for XmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XmlNode(<{}>)", self.describe())
    }
}

fn describe_kind(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Element { name, .. } => name.clone(),
        NodeKind::Text(_) => "#text".to_string(),
        NodeKind::Comment(_) => "#comment".to_string(),
    }
}

/// Whether `name` is a usable element name: an NCName, optionally prefixed
pub(crate) fn is_valid_name(name: &str) -> bool {
    fn is_ncname(part: &str) -> bool {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    }

    match name.split_once(':') {
        Some((prefix, local)) => is_ncname(prefix) && is_ncname(local),
        None => is_ncname(name),
    }
}
