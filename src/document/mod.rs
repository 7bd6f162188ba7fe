//! Document model - structural wrappers over a WordprocessingML tree

mod body;
mod bookmark;
mod paragraph;
mod run;
mod table;
mod text;

pub use body::{BlockContent, Body};
pub use bookmark::Bookmark;
pub use paragraph::Paragraph;
pub use run::TextRun;
pub use table::{Table, TableCell, TableRow};
pub use text::Text;

use crate::element::{Element, ElementFactory};
use crate::error::{Error, Result};
use crate::xml::{self, ParseOptions, XmlDocument, XmlNode};

/// A WordprocessingML main document part (`w:document`)
#[derive(Clone, Debug)]
pub struct Document {
    xml: XmlDocument,
}

impl Document {
    /// Create an empty document: `w:document` with the standard namespace
    /// declarations and an empty `w:body`
    pub fn new() -> Self {
        let tree = XmlDocument::new();
        let root = XmlNode::element_unchecked("w:document", &tree);
        for (attr, value) in xml::document_namespaces() {
            root.set_attr(attr, value);
        }
        root.push_child(XmlNode::element_unchecked(&Body::qualified_tag(), &tree));
        tree.install_root(root);
        Self { xml: tree }
    }

    /// Parse document.xml content with default options
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_with(xml, &ParseOptions::default())
    }

    pub fn parse_with(xml: &str, options: &ParseOptions) -> Result<Self> {
        Self::from_xml(XmlDocument::parse_with(xml, options)?)
    }

    /// Wrap an already parsed tree. The root must contain a `w:body`.
    pub fn from_xml(xml: XmlDocument) -> Result<Self> {
        let document = Self { xml };
        if document.body().is_none() {
            return Err(Error::InvalidDocument("Missing w:body element".into()));
        }
        Ok(document)
    }

    /// Underlying XML tree
    pub fn xml(&self) -> &XmlDocument {
        &self.xml
    }

    pub fn body(&self) -> Option<Body> {
        self.xml
            .root()?
            .child_element(&Body::qualified_tag())
            .map(Body::from_node)
    }

    /// Top-level body paragraphs
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        self.body().map(|b| b.paragraphs()).unwrap_or_default()
    }

    pub fn tables(&self) -> Vec<Table> {
        self.body().map(|b| b.tables()).unwrap_or_default()
    }

    /// All bookmark start markers, in document order
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        let Some(root) = self.xml.root() else {
            return Vec::new();
        };
        let tag = Bookmark::qualified_tag();
        root.descendants()
            .into_iter()
            .filter(|node| node.has_name(&tag))
            .map(Bookmark::from_node)
            .collect()
    }

    /// Find a bookmark by name
    pub fn bookmark(&self, name: &str) -> Option<Bookmark> {
        self.bookmarks()
            .into_iter()
            .find(|mark| mark.name().as_deref() == Some(name))
    }

    /// Plain text, one line per top-level paragraph
    pub fn text(&self) -> String {
        self.paragraphs()
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Add a paragraph at the end of the body
    pub fn add_paragraph(&mut self, text: &str) -> Result<Paragraph> {
        let mut body = self
            .body()
            .ok_or_else(|| Error::InvalidDocument("Missing w:body element".into()))?;
        body.add_paragraph(text)
    }

    /// Serialize to document.xml content
    pub fn to_xml(&self) -> Result<String> {
        self.xml.to_xml()
    }

    /// HTML preview of the body content
    pub fn to_html(&self) -> String {
        match self.body() {
            Some(body) => body.to_html(),
            None => {
                log::warn!("document has no w:body, rendering nothing");
                String::new()
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
