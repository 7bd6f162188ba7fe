//! Document body and block-level content

use crate::document::{Paragraph, Table};
use crate::element::{Element, ElementFactory, TagOptions};
use crate::error::Result;
use crate::xml::XmlNode;

const SECTION_PROPERTIES: &str = "w:sectPr";

/// Block-level content in a document body
#[derive(Clone, Debug)]
pub enum BlockContent {
    Paragraph(Paragraph),
    Table(Table),
    /// Any other element (section properties, structured tags, ...)
    Other(XmlNode),
}

impl BlockContent {
    fn from_node(node: XmlNode) -> Self {
        if node.has_name(&Paragraph::qualified_tag()) {
            BlockContent::Paragraph(Paragraph::from_node(node))
        } else if node.has_name(&Table::qualified_tag()) {
            BlockContent::Table(Table::from_node(node))
        } else {
            BlockContent::Other(node)
        }
    }

    /// HTML preview; elements without a preview render as nothing
    pub fn to_html(&self) -> String {
        match self {
            BlockContent::Paragraph(para) => para.to_html(),
            BlockContent::Table(table) => table.to_html(),
            BlockContent::Other(_) => String::new(),
        }
    }
}

/// Document body (w:body)
#[derive(Clone, Debug)]
pub struct Body {
    node: XmlNode,
}

impl Element for Body {
    fn node(&self) -> &XmlNode {
        &self.node
    }

    fn set_node(&mut self, node: XmlNode) {
        self.node = node;
    }

    fn from_node(node: XmlNode) -> Self {
        Self { node }
    }
}

impl ElementFactory for Body {
    const TAG: &'static str = "body";
}

impl Body {
    /// Block-level children in document order
    pub fn content(&self) -> Vec<BlockContent> {
        self.node
            .element_children()
            .into_iter()
            .map(BlockContent::from_node)
            .collect()
    }

    /// Top-level paragraphs (not the ones nested in tables)
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        self.content()
            .into_iter()
            .filter_map(|c| match c {
                BlockContent::Paragraph(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn tables(&self) -> Vec<Table> {
        self.content()
            .into_iter()
            .filter_map(|c| match c {
                BlockContent::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// Section properties (w:sectPr), which must stay the last body child
    pub fn section_properties(&self) -> Option<XmlNode> {
        self.node.child_element(SECTION_PROPERTIES)
    }

    /// Add a paragraph with text at the end of the body, keeping the
    /// section properties last
    pub fn add_paragraph(&mut self, text: &str) -> Result<Paragraph> {
        let mut para = Paragraph::create_with(&*self)?;
        match self.section_properties() {
            Some(section) => {
                let node = section.add_previous_sibling(para.node().clone())?;
                para.set_node(node);
            }
            None => {
                para.append_to(&*self)?;
            }
        }
        if !text.is_empty() {
            para.set_text(text)?;
        }
        Ok(para)
    }

    pub fn to_html(&self) -> String {
        self.content().iter().map(BlockContent::to_html).collect()
    }

    /// Render the body content wrapped in a `<div>`
    pub fn to_html_with(&self, options: &TagOptions) -> String {
        let options = options.clone().with_content(self.to_html());
        self.html_tag("div", &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use pretty_assertions::assert_eq;

    fn body(xml: &str) -> (XmlDocument, Body) {
        let doc = XmlDocument::parse(xml).unwrap();
        let body = Body::from_node(doc.root().unwrap());
        (doc, body)
    }

    #[test]
    fn test_block_content() {
        let (_doc, body) = body(
            r#"<w:body><w:p/><w:tbl/><w:sdt/><w:p/><w:sectPr/></w:body>"#,
        );
        assert_eq!(body.content().len(), 5);
        assert_eq!(body.paragraphs().len(), 2);
        assert_eq!(body.tables().len(), 1);
        assert!(body.section_properties().is_some());
    }

    #[test]
    fn test_add_paragraph_before_section_properties() {
        let (_doc, mut body) = body(
            r#"<w:body><w:p><w:r><w:t>first</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="11906"/></w:sectPr></w:body>"#,
        );
        let para = body.add_paragraph("second").unwrap();
        assert_eq!(para.text(), "second");

        let names: Vec<_> = body
            .node()
            .element_children()
            .iter()
            .filter_map(XmlNode::name)
            .collect();
        assert_eq!(names, vec!["w:p", "w:p", "w:sectPr"]);
    }

    #[test]
    fn test_add_paragraph_without_section_properties() {
        let (_doc, mut body) = body("<w:body/>");
        body.add_paragraph("").unwrap();
        body.add_paragraph("x").unwrap();
        assert_eq!(
            body.node().to_xml().unwrap(),
            "<w:body><w:p/><w:p><w:r><w:t>x</w:t></w:r></w:p></w:body>"
        );
    }

    #[test]
    fn test_to_html_skips_unknown_blocks() {
        let (_doc, body) = body(
            r#"<w:body><w:p><w:r><w:t>a</w:t></w:r></w:p><w:sectPr/></w:body>"#,
        );
        assert_eq!(body.to_html(), "<p>a</p>");
        assert_eq!(
            body.to_html_with(&TagOptions::new().with_attribute("class", "page")),
            r#"<div class="page"><p>a</p></div>"#
        );
    }
}
