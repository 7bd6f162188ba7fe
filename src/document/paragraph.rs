//! Paragraph element (w:p)

use crate::document::TextRun;
use crate::element::{Element, ElementFactory, TagOptions};
use crate::error::Result;
use crate::xml::XmlNode;

const HYPERLINK: &str = "w:hyperlink";

/// Paragraph element (w:p)
#[derive(Clone, Debug)]
pub struct Paragraph {
    node: XmlNode,
}

impl Element for Paragraph {
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

impl ElementFactory for Paragraph {
    const TAG: &'static str = "p";
}

impl Paragraph {
    /// Runs in document order, including runs nested in hyperlinks
    pub fn text_runs(&self) -> Vec<TextRun> {
        let run_tag = TextRun::qualified_tag();
        let mut runs = Vec::new();
        for child in self.node.element_children() {
            if child.has_name(&run_tag) {
                runs.push(TextRun::from_node(child));
            } else if child.has_name(HYPERLINK) {
                runs.extend(
                    child
                        .element_children()
                        .into_iter()
                        .filter(|c| c.has_name(&run_tag))
                        .map(TextRun::from_node),
                );
            }
        }
        runs
    }

    /// Get all text in this paragraph
    pub fn text(&self) -> String {
        self.text_runs().iter().map(TextRun::text).collect()
    }

    /// Replace the paragraph text.
    ///
    /// A single run keeps its formatting; otherwise all runs are dropped and
    /// one plain run is appended.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let mut runs = self.text_runs();
        if runs.len() == 1 {
            return runs[0].set_text(text);
        }
        for run in &runs {
            run.node().remove();
        }
        let mut run = TextRun::create_within(&*self)?;
        run.set_text(text)
    }

    /// Empty every run, keeping runs and their formatting in place
    pub fn blank(&mut self) -> Result<()> {
        for mut run in self.text_runs() {
            run.blank()?;
        }
        Ok(())
    }

    /// Remove this paragraph from the document
    pub fn remove(self) {
        self.node.remove();
    }

    /// Paragraph properties (w:pPr)
    pub fn properties(&self) -> Option<XmlNode> {
        self.node.properties()
    }

    /// Justification value (w:pPr/w:jc)
    pub fn alignment(&self) -> Option<String> {
        self.properties()?.child_element("w:jc")?.attr("w:val")
    }

    /// Style ID (w:pPr/w:pStyle)
    pub fn style(&self) -> Option<String> {
        self.properties()?.child_element("w:pStyle")?.attr("w:val")
    }

    /// Paragraph-mark font size in points (w:pPr/w:rPr/w:sz, in half-points)
    pub fn font_size(&self) -> Option<f32> {
        let size = self
            .properties()?
            .child_element("w:rPr")?
            .child_element("w:sz")?
            .attr("w:val")?;
        size.parse::<f32>().ok().map(|half_points| half_points / 2.0)
    }

    /// Render as `<p>` with one fragment per run and an `<a>` per hyperlink.
    ///
    /// Runs repeat the font size only where it differs from the paragraph's.
    pub fn to_html(&self) -> String {
        let paragraph_size = self.font_size();
        let run_tag = TextRun::qualified_tag();
        let runs_html = |node: &XmlNode| -> String {
            node.element_children()
                .into_iter()
                .filter(|c| c.has_name(&run_tag))
                .map(|c| TextRun::from_node(c).to_html_within(paragraph_size))
                .collect()
        };

        let mut content = String::new();
        for child in self.node.element_children() {
            if child.has_name(&run_tag) {
                content.push_str(&TextRun::from_node(child).to_html_within(paragraph_size));
            } else if child.has_name(HYPERLINK) {
                let mut link = TagOptions::new().with_content(runs_html(&child));
                if let Some(href) = hyperlink_target(&child) {
                    link = link.with_attribute("href", href);
                }
                content.push_str(&self.html_tag("a", &link));
            }
        }

        let mut options = TagOptions::new().with_content(content);
        if let Some(size) = paragraph_size {
            options.push_style("font-size", format!("{size}pt"));
        }
        if let Some(alignment) = self.alignment() {
            options.push_style("text-align", css_alignment(&alignment));
        }
        self.html_tag("p", &options)
    }
}

/// `#anchor` for internal links, otherwise the relationship id; the
/// relationship part is not resolved here
fn hyperlink_target(link: &XmlNode) -> Option<String> {
    match link.attr("w:anchor") {
        Some(anchor) => Some(format!("#{anchor}")),
        None => link.attr("r:id"),
    }
}

/// Map OOXML justification to CSS text-align
fn css_alignment(value: &str) -> &str {
    match value {
        "both" | "distribute" => "justify",
        "start" => "left",
        "end" => "right",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use pretty_assertions::assert_eq;

    fn paragraph(xml: &str) -> (XmlDocument, Paragraph) {
        let doc = XmlDocument::parse(xml).unwrap();
        let para = Paragraph::from_node(doc.root().unwrap());
        (doc, para)
    }

    #[test]
    fn test_text_includes_hyperlinks() {
        let (_doc, para) = paragraph(
            r#"<w:p><w:r><w:t>Visit </w:t></w:r><w:hyperlink r:id="rId1"><w:r><w:t>site</w:t></w:r></w:hyperlink><w:r><w:t>!</w:t></w:r></w:p>"#,
        );
        assert_eq!(para.text_runs().len(), 3);
        assert_eq!(para.text(), "Visit site!");
    }

    #[test]
    fn test_properties_accessors() {
        let (_doc, para) = paragraph(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="both"/><w:rPr><w:sz w:val="28"/></w:rPr></w:pPr></w:p>"#,
        );
        assert_eq!(para.style().as_deref(), Some("Heading1"));
        assert_eq!(para.alignment().as_deref(), Some("both"));
        assert_eq!(para.font_size(), Some(14.0));
    }

    #[test]
    fn test_set_text_single_run_keeps_formatting() {
        let (_doc, mut para) = paragraph(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>old</w:t></w:r></w:p>"#,
        );
        para.set_text("new").unwrap();
        assert_eq!(
            para.node().to_xml().unwrap(),
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>new</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_set_text_collapses_runs() {
        let (_doc, mut para) = paragraph(
            r#"<w:p><w:pPr/><w:r><w:t>a</w:t></w:r><w:r><w:t>b</w:t></w:r></w:p>"#,
        );
        para.set_text("c").unwrap();
        assert_eq!(
            para.node().to_xml().unwrap(),
            r#"<w:p><w:pPr/><w:r><w:t>c</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_set_text_on_empty_paragraph() {
        let (_doc, mut para) = paragraph("<w:p/>");
        para.set_text("hello").unwrap();
        assert_eq!(para.text(), "hello");
        assert_eq!(para.text_runs().len(), 1);
    }

    #[test]
    fn test_blank_keeps_runs() {
        let (_doc, mut para) = paragraph(
            r#"<w:p><w:r><w:t>a</w:t></w:r><w:r><w:t>b</w:t></w:r></w:p>"#,
        );
        para.blank().unwrap();
        assert_eq!(para.text(), "");
        assert_eq!(para.text_runs().len(), 2);
    }

    #[test]
    fn test_to_html() {
        let (_doc, para) = paragraph(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>a &lt; b</w:t></w:r></w:p>"#,
        );
        assert_eq!(
            para.to_html(),
            r#"<p style="text-align:center;"><strong>a &lt; b</strong></p>"#
        );
    }

    #[test]
    fn test_to_html_escapes_alignment() {
        let (_doc, para) = paragraph(
            r#"<w:p><w:pPr><w:jc w:val="x&quot; onmouseover=&quot;alert(1)"/></w:pPr><w:r><w:t>hi</w:t></w:r></w:p>"#,
        );
        assert_eq!(
            para.to_html(),
            r#"<p style="text-align:x&quot; onmouseover=&quot;alert(1);">hi</p>"#
        );
    }

    #[test]
    fn test_to_html_runs_inherit_paragraph_size() {
        let (_doc, para) = paragraph(
            r#"<w:p><w:pPr><w:rPr><w:sz w:val="24"/></w:rPr></w:pPr><w:r><w:rPr><w:sz w:val="24"/></w:rPr><w:t>same</w:t></w:r><w:r><w:rPr><w:sz w:val="32"/></w:rPr><w:t>big</w:t></w:r></w:p>"#,
        );
        assert_eq!(
            para.to_html(),
            r#"<p style="font-size:12pt;">same<span style="font-size:16pt;">big</span></p>"#
        );
    }

    #[test]
    fn test_to_html_hyperlinks() {
        let (_doc, para) = paragraph(
            r#"<w:p><w:r><w:t>See </w:t></w:r><w:hyperlink w:anchor="terms"><w:r><w:rPr><w:i/></w:rPr><w:t>terms</w:t></w:r></w:hyperlink><w:r><w:t> or </w:t></w:r><w:hyperlink r:id="rId4"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>"#,
        );
        assert_eq!(
            para.to_html(),
            r##"<p>See <a href="#terms"><em>terms</em></a> or <a href="rId4">site</a></p>"##
        );
    }

    #[test]
    fn test_remove() {
        let doc = XmlDocument::parse("<w:body><w:p/><w:p/></w:body>").unwrap();
        let body = doc.root().unwrap();
        Paragraph::from_node(body.first_child().unwrap()).remove();
        assert_eq!(body.children().len(), 1);
    }
}
