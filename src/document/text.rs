//! Text element (w:t)

use crate::element::{Element, ElementFactory};
use crate::xml::XmlNode;

/// Text element (w:t)
#[derive(Clone, Debug)]
pub struct Text {
    node: XmlNode,
}

impl Element for Text {
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

impl ElementFactory for Text {
    const TAG: &'static str = "t";
}

impl Text {
    pub fn content(&self) -> String {
        self.node.text_content()
    }

    /// Replace the text, marking it `xml:space="preserve"` when Word would
    /// otherwise collapse its whitespace
    pub fn set_content(&mut self, text: &str) {
        self.node.set_content(text);
        if needs_preserve(text) {
            self.node.set_attr("xml:space", "preserve");
        } else {
            self.node.remove_attr("xml:space");
        }
    }
}

fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    #[test]
    fn test_preserve_toggles() {
        let doc = XmlDocument::parse(r#"<w:t xml:space="preserve"> a </w:t>"#).unwrap();
        let mut text = Text::from_node(doc.root().unwrap());
        assert_eq!(text.content(), " a ");

        text.set_content("b");
        assert_eq!(text.node().to_xml().unwrap(), "<w:t>b</w:t>");

        text.set_content("b ");
        assert_eq!(
            text.node().to_xml().unwrap(),
            r#"<w:t xml:space="preserve">b </w:t>"#
        );
    }
}
