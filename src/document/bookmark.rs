//! Bookmark start marker (w:bookmarkStart) and text insertion around it

use crate::document::TextRun;
use crate::element::{Element, ElementFactory};
use crate::error::{Error, Result};
use crate::xml::XmlNode;

/// Bookmark start marker (w:bookmarkStart)
#[derive(Clone, Debug)]
pub struct Bookmark {
    node: XmlNode,
}

impl Element for Bookmark {
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

impl ElementFactory for Bookmark {
    const TAG: &'static str = "bookmarkStart";
}

impl Bookmark {
    /// Bookmark name (w:name)
    pub fn name(&self) -> Option<String> {
        self.node.attr("w:name")
    }

    /// Append `text` to the run right before the bookmark
    pub fn insert_text_before(&mut self, text: &str) -> Result<()> {
        let mut run = self.run_before()?;
        let current = run.text();
        run.set_text(&format!("{current}{text}"))
    }

    /// Prepend `text` to the run right after the bookmark
    pub fn insert_text_after(&mut self, text: &str) -> Result<()> {
        let mut run = self.run_after()?;
        let current = run.text();
        run.set_text(&format!("{text}{current}"))
    }

    /// Replace the containing paragraph with one paragraph per line.
    ///
    /// The paragraph is blanked and copied once per extra line, each copy
    /// placed after the previous one, so every line keeps the original
    /// paragraph and run formatting.
    pub fn insert_multiple_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<()> {
        let mut paragraph = self.parent_paragraph().ok_or_else(|| {
            Error::InvalidOperand("bookmark is not inside a paragraph".into())
        })?;
        paragraph.blank()?;

        let mut paragraphs = vec![paragraph];
        for _ in 1..lines.len() {
            let previous = &paragraphs[paragraphs.len() - 1];
            let mut next = previous.copy();
            next.insert_after(previous)?;
            paragraphs.push(next);
        }

        for (paragraph, line) in paragraphs.iter_mut().zip(lines) {
            paragraph.set_text(line.as_ref())?;
        }
        Ok(())
    }

    /// Last run before the bookmark, created right before it if missing
    fn run_before(&self) -> Result<TextRun> {
        let path = format!("preceding-sibling::{}", TextRun::qualified_tag());
        if let Some(node) = self.xpath(&path)?.pop() {
            return Ok(TextRun::from_node(node));
        }
        let mut run = TextRun::create_with(self)?;
        run.insert_before(self)?;
        Ok(run)
    }

    /// First run after the bookmark, created right after it if missing
    fn run_after(&self) -> Result<TextRun> {
        let path = format!("following-sibling::{}", TextRun::qualified_tag());
        if let Some(node) = self.at_xpath(&path)? {
            return Ok(TextRun::from_node(node));
        }
        let mut run = TextRun::create_with(self)?;
        run.insert_after(self)?;
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use pretty_assertions::assert_eq;

    fn bookmark(xml: &str) -> (XmlDocument, Bookmark) {
        let doc = XmlDocument::parse(xml).unwrap();
        let node = doc
            .root()
            .unwrap()
            .at_xpath("//w:bookmarkStart")
            .unwrap()
            .unwrap();
        (doc, Bookmark::from_node(node))
    }

    #[test]
    fn test_insert_around_existing_runs() {
        let (doc, mut mark) = bookmark(
            r#"<w:p><w:r><w:t>Hello</w:t></w:r><w:bookmarkStart w:id="0" w:name="greeting"/><w:bookmarkEnd w:id="0"/><w:r><w:t>world</w:t></w:r></w:p>"#,
        );
        assert_eq!(mark.name().as_deref(), Some("greeting"));

        mark.insert_text_before(", ").unwrap();
        mark.insert_text_after("dear ").unwrap();

        let para = mark.parent_paragraph().unwrap();
        assert_eq!(para.text(), "Hello, dear world");
        assert_eq!(para.text_runs().len(), 2);
        drop(doc);
    }

    #[test]
    fn test_insert_creates_missing_runs() {
        let (_doc, mut mark) = bookmark(r#"<w:p><w:bookmarkStart w:id="1" w:name="m"/></w:p>"#);

        mark.insert_text_before("before").unwrap();
        mark.insert_text_after("after").unwrap();

        let para = mark.parent_paragraph().unwrap();
        assert_eq!(
            para.node().to_xml().unwrap(),
            r#"<w:p><w:r><w:t>before</w:t></w:r><w:bookmarkStart w:id="1" w:name="m"/><w:r><w:t>after</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_insert_multiple_lines() {
        let (doc, mut mark) = bookmark(
            r#"<w:body><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:bookmarkStart w:id="2" w:name="list"/><w:r><w:rPr><w:b/></w:rPr><w:t>placeholder</w:t></w:r></w:p><w:p><w:r><w:t>tail</w:t></w:r></w:p></w:body>"#,
        );
        mark.insert_multiple_lines(&["one", "two", "three"]).unwrap();

        let body = doc.root().unwrap();
        let texts: Vec<_> = body
            .element_children()
            .iter()
            .map(|p| p.text_content())
            .collect();
        assert_eq!(texts, vec!["one", "two", "three", "tail"]);

        // Every copy keeps paragraph and run formatting
        for para in &body.element_children()[..3] {
            assert!(para.at_xpath("w:pPr/w:jc").unwrap().is_some());
            assert!(para.at_xpath("w:r/w:rPr/w:b").unwrap().is_some());
        }
    }

    #[test]
    fn test_multiple_lines_outside_paragraph() {
        let (_doc, mut mark) = bookmark(r#"<w:body><w:bookmarkStart w:name="x"/></w:body>"#);
        assert!(matches!(
            mark.insert_multiple_lines(&["a"]),
            Err(Error::InvalidOperand(_))
        ));
    }
}
