//! Run element (w:r) - a contiguous run of text with uniform formatting

use quick_xml::escape::partial_escape;

use crate::document::Text;
use crate::element::{Element, ElementFactory, TagOptions};
use crate::error::{Error, Result};
use crate::xml::{is_toggle_on, XmlNode};

/// Children that carry run content, as opposed to properties
const CONTENT_TAGS: [&str; 4] = ["w:t", "w:tab", "w:br", "w:cr"];

/// Schema order of w:rPr children (CT_RPr)
const PROPERTY_ORDER: [&str; 39] = [
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:outline",
    "w:shadow",
    "w:emboss",
    "w:imprint",
    "w:noProof",
    "w:snapToGrid",
    "w:vanish",
    "w:webHidden",
    "w:color",
    "w:spacing",
    "w:w",
    "w:kern",
    "w:position",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
    "w:eastAsianLayout",
    "w:specVanish",
    "w:oMath",
];

fn property_rank(name: &str) -> Option<usize> {
    PROPERTY_ORDER.iter().position(|tag| *tag == name)
}

/// Run element (w:r)
#[derive(Clone, Debug)]
pub struct TextRun {
    node: XmlNode,
}

impl Element for TextRun {
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

impl ElementFactory for TextRun {
    const TAG: &'static str = "r";
}

impl TextRun {
    /// Get all text in this run
    pub fn text(&self) -> String {
        let mut result = String::new();
        for child in self.node.element_children() {
            match child.name().as_deref() {
                Some("w:t") => result.push_str(&child.text_content()),
                Some("w:tab") => result.push('\t'),
                Some("w:br") | Some("w:cr") => result.push('\n'),
                _ => {}
            }
        }
        result
    }

    /// Text nodes (w:t) of this run
    pub fn text_nodes(&self) -> Vec<Text> {
        let tag = Text::qualified_tag();
        self.node
            .element_children()
            .into_iter()
            .filter(|c| c.has_name(&tag))
            .map(Text::from_node)
            .collect()
    }

    /// Replace all run content with a single w:t, keeping run properties
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        for child in self.node.element_children() {
            if CONTENT_TAGS.iter().any(|tag| child.has_name(tag)) {
                child.remove();
            }
        }
        let mut text_node = Text::create_within(&*self)?;
        text_node.set_content(text);
        Ok(())
    }

    /// Clear the run's text
    pub fn blank(&mut self) -> Result<()> {
        self.set_text("")
    }

    /// Replace every occurrence of `pattern` inside the run's text nodes
    pub fn substitute(&mut self, pattern: &str, replacement: &str) {
        if pattern.is_empty() {
            return;
        }
        for mut text in self.text_nodes() {
            let content = text.content();
            if content.contains(pattern) {
                text.set_content(&content.replace(pattern, replacement));
            }
        }
    }

    /// Run properties (w:rPr)
    pub fn properties(&self) -> Option<XmlNode> {
        self.node.properties()
    }

    fn toggle(&self, name: &str) -> bool {
        self.properties()
            .and_then(|props| props.child_element(name))
            .map(|elem| is_toggle_on(elem.attr("w:val").as_deref()))
            .unwrap_or(false)
    }

    /// Check if bold
    pub fn is_bold(&self) -> bool {
        self.toggle("w:b")
    }

    /// Check if italic
    pub fn is_italic(&self) -> bool {
        self.toggle("w:i")
    }

    /// Check if underlined (any w:u other than "none")
    pub fn is_underlined(&self) -> bool {
        self.properties()
            .and_then(|props| props.child_element("w:u"))
            .map(|u| u.attr("w:val").as_deref() != Some("none"))
            .unwrap_or(false)
    }

    /// Font size in points (w:sz is in half-points)
    pub fn font_size(&self) -> Option<f32> {
        let size = self.properties()?.child_element("w:sz")?.attr("w:val")?;
        size.parse::<f32>().ok().map(|half_points| half_points / 2.0)
    }

    /// Set bold
    pub fn set_bold(&mut self, bold: bool) -> Result<()> {
        self.set_toggle("w:b", bold)
    }

    /// Set italic
    pub fn set_italic(&mut self, italic: bool) -> Result<()> {
        self.set_toggle("w:i", italic)
    }

    fn set_toggle(&mut self, name: &str, on: bool) -> Result<()> {
        match self.properties().and_then(|props| props.child_element(name)) {
            Some(existing) if on => {
                existing.remove_attr("w:val");
            }
            Some(existing) => existing.set_attr("w:val", "0"),
            None if on => {
                let props = self.ensure_properties()?;
                let document = props.document().ok_or(Error::DetachedContext)?;
                insert_property(&props, XmlNode::new_element(name, &document)?)?;
            }
            None => {}
        }
        Ok(())
    }

    /// Properties child, created as the first child when missing
    fn ensure_properties(&mut self) -> Result<XmlNode> {
        if let Some(props) = self.properties() {
            return Ok(props);
        }
        let document = self.node.document().ok_or(Error::DetachedContext)?;
        let props = XmlNode::new_element(&format!("{}Pr", Self::qualified_tag()), &document)?;
        self.node.insert_child(0, props)
    }

    /// Render as HTML: `<em>`/`<strong>` for italic/bold, a styled `<span>`
    /// for underline and explicit font size
    pub fn to_html(&self) -> String {
        self.to_html_within(None)
    }

    /// Like [`to_html`](Self::to_html), leaving out a font size equal to
    /// `inherited_size`, the size of the enclosing paragraph
    pub fn to_html_within(&self, inherited_size: Option<f32>) -> String {
        let mut html = partial_escape(self.text().as_str()).into_owned();
        if self.is_italic() {
            html = self.html_tag("em", &TagOptions::new().with_content(html));
        }
        if self.is_bold() {
            html = self.html_tag("strong", &TagOptions::new().with_content(html));
        }

        let mut styles = TagOptions::new();
        if self.is_underlined() {
            styles.push_style("text-decoration", "underline");
        }
        if let Some(size) = self.font_size().filter(|size| Some(*size) != inherited_size) {
            styles.push_style("font-size", format!("{size}pt"));
        }
        if styles.has_styles() {
            html = self.html_tag("span", &styles.with_content(html));
        }
        html
    }
}

/// Insert `property` into `props` ahead of the first sibling that follows it
/// in schema order
fn insert_property(props: &XmlNode, property: XmlNode) -> Result<XmlNode> {
    let rank = property
        .name()
        .as_deref()
        .and_then(property_rank)
        .unwrap_or(PROPERTY_ORDER.len());
    let next = props.element_children().into_iter().find(|child| {
        child
            .name()
            .as_deref()
            .and_then(property_rank)
            .is_some_and(|other| other > rank)
    });
    match next {
        Some(next) => next.add_previous_sibling(property),
        None => props.add_child(property),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use pretty_assertions::assert_eq;

    fn run(xml: &str) -> (XmlDocument, TextRun) {
        let doc = XmlDocument::parse(xml).unwrap();
        let run = TextRun::from_node(doc.root().unwrap());
        (doc, run)
    }

    #[test]
    fn test_text_with_tabs_and_breaks() {
        let (_doc, run) = run(r#"<w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r>"#);
        assert_eq!(run.text(), "a\tb\nc");
        assert_eq!(run.text_nodes().len(), 3);
    }

    #[test]
    fn test_set_text_keeps_properties() {
        let (_doc, mut run) = run(r#"<w:r><w:rPr><w:i/></w:rPr><w:t>a</w:t><w:tab/><w:t>b</w:t></w:r>"#);
        run.set_text("  spaced").unwrap();
        assert_eq!(
            run.node().to_xml().unwrap(),
            r#"<w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">  spaced</w:t></w:r>"#
        );
    }

    #[test]
    fn test_substitute() {
        let (_doc, mut run) = run(r#"<w:r><w:t>Dear NAME,</w:t><w:t> NAME!</w:t></w:r>"#);
        run.substitute("NAME", "Ada");
        assert_eq!(run.text(), "Dear Ada, Ada!");
    }

    #[test]
    fn test_formatting_flags() {
        let (_doc, run) = run(
            r#"<w:r><w:rPr><w:b/><w:i w:val="0"/><w:u w:val="single"/><w:sz w:val="24"/></w:rPr></w:r>"#,
        );
        assert!(run.is_bold());
        assert!(!run.is_italic());
        assert!(run.is_underlined());
        assert_eq!(run.font_size(), Some(12.0));
    }

    #[test]
    fn test_set_bold_creates_properties_first() {
        let (_doc, mut run) = run(r#"<w:r><w:t>x</w:t></w:r>"#);
        run.set_bold(true).unwrap();
        run.set_italic(true).unwrap();
        assert_eq!(
            run.node().to_xml().unwrap(),
            r#"<w:r><w:rPr><w:b/><w:i/></w:rPr><w:t>x</w:t></w:r>"#
        );

        run.set_bold(false).unwrap();
        assert!(!run.is_bold());
        assert!(run.is_italic());
    }

    #[test]
    fn test_toggles_follow_schema_order() {
        let (_doc, mut run) = run(
            r#"<w:r><w:rPr><w:rFonts w:ascii="Arial"/><w:sz w:val="24"/><w:u w:val="single"/></w:rPr><w:t>x</w:t></w:r>"#,
        );
        run.set_italic(true).unwrap();
        run.set_bold(true).unwrap();
        assert_eq!(
            run.properties().unwrap().to_xml().unwrap(),
            r#"<w:rPr><w:rFonts w:ascii="Arial"/><w:b/><w:i/><w:sz w:val="24"/><w:u w:val="single"/></w:rPr>"#
        );
    }

    #[test]
    fn test_inherited_font_size_omitted() {
        let (_doc, run) = run(r#"<w:r><w:rPr><w:b/><w:sz w:val="28"/></w:rPr><w:t>x</w:t></w:r>"#);
        assert_eq!(run.to_html_within(Some(14.0)), "<strong>x</strong>");
        assert_eq!(
            run.to_html_within(Some(12.0)),
            r#"<span style="font-size:14pt;"><strong>x</strong></span>"#
        );
    }

    #[test]
    fn test_to_html() {
        let (_doc, run) = run(
            r#"<w:r><w:rPr><w:b/><w:i/><w:u w:val="single"/><w:sz w:val="20"/></w:rPr><w:t>x &amp; y</w:t></w:r>"#,
        );
        assert_eq!(
            run.to_html(),
            r#"<span style="text-decoration:underline;font-size:10pt;"><strong><em>x &amp; y</em></strong></span>"#
        );
    }

    #[test]
    fn test_plain_to_html_is_text() {
        let (_doc, run) = run(r#"<w:r><w:t>plain</w:t></w:r>"#);
        assert_eq!(run.to_html(), "plain");
    }
}
