//! Element capability and factory contracts
//!
//! Every structural wrapper (paragraph, run, table cell, ...) implements
//! [`Element`] to get navigation and mutation over its node, and
//! [`ElementFactory`] to be constructible from the tag it wraps.
//!
//! The tree is the source of truth: wrappers hold a node handle and nothing
//! else. Mutations always store the node handed back by the tree, which can
//! differ from the one passed in (a node linked into another document is
//! imported as a copy).

mod html;

pub use html::{html_tag, TagOptions};

use crate::document::Paragraph;
use crate::error::{Error, Result};
use crate::xml::{XmlNode, W_PREFIX};

/// Instance-level capability shared by all structural wrappers
pub trait Element {
    /// The wrapped node
    fn node(&self) -> &XmlNode;

    /// Replace the wrapped node
    fn set_node(&mut self, node: XmlNode);

    /// Wrap an existing node
    fn from_node(node: XmlNode) -> Self
    where
        Self: Sized;

    /// Nearest ancestor element, optionally restricted to a qualified name.
    /// Looked up against the current tree on every call.
    fn parent(&self, filter: Option<&str>) -> Option<XmlNode> {
        self.node().nearest_ancestor(filter)
    }

    /// Paragraph containing this element, if any
    fn parent_paragraph(&self) -> Option<Paragraph> {
        self.parent(Some(&Paragraph::qualified_tag()))
            .map(Paragraph::from_node)
    }

    /// Evaluate a location path relative to the wrapped node
    fn xpath(&self, path: &str) -> Result<Vec<XmlNode>> {
        self.node().xpath(path)
    }

    /// First match of a location path relative to the wrapped node
    fn at_xpath(&self, path: &str) -> Result<Option<XmlNode>> {
        self.node().at_xpath(path)
    }

    /// Attach as the last child of `target`
    fn append_to<T: Element + ?Sized>(&mut self, target: &T) -> Result<&mut Self> {
        let node = target.node().add_child(self.node().clone())?;
        self.set_node(node);
        Ok(self)
    }

    /// Attach as the first content child of `target`: right after its
    /// properties child, or as the very first child when it has none.
    fn prepend_to<T: Element + ?Sized>(&mut self, target: &T) -> Result<&mut Self> {
        let target = target.node();
        let node = match target.properties() {
            Some(properties) => properties.add_next_sibling(self.node().clone())?,
            None => target.insert_child(0, self.node().clone())?,
        };
        self.set_node(node);
        Ok(self)
    }

    /// Move to directly after `anchor`, wherever it lives
    fn insert_after<T: Element + ?Sized>(&mut self, anchor: &T) -> Result<&mut Self> {
        let node = anchor.node().add_next_sibling(self.node().clone())?;
        self.set_node(node);
        Ok(self)
    }

    /// Move to directly before `anchor`, wherever it lives
    fn insert_before<T: Element + ?Sized>(&mut self, anchor: &T) -> Result<&mut Self> {
        let node = anchor.node().add_previous_sibling(self.node().clone())?;
        self.set_node(node);
        Ok(self)
    }

    /// Same wrapper type around a deep, unattached copy of the node
    fn copy(&self) -> Self
    where
        Self: Sized,
    {
        Self::from_node(self.node().duplicate())
    }

    /// Render a minimal HTML fragment (see [`html_tag`])
    fn html_tag(&self, name: &str, options: &TagOptions) -> String {
        html_tag(name, options)
    }
}

/// Type-level contract: the tag a wrapper stands for and how to build one
pub trait ElementFactory: Element + Sized {
    /// Local element name, e.g. "p" for paragraphs
    const TAG: &'static str;

    /// Namespace prefix placed in front of [`Self::TAG`]
    const NAMESPACE_PREFIX: &'static str = W_PREFIX;

    fn tag() -> &'static str {
        Self::TAG
    }

    /// Prefixed element name, e.g. "w:p"
    fn qualified_tag() -> String {
        if Self::NAMESPACE_PREFIX.is_empty() {
            Self::TAG.to_string()
        } else {
            format!("{}:{}", Self::NAMESPACE_PREFIX, Self::TAG)
        }
    }

    /// Build a new, unattached element in the same document as `context`
    fn create_with<C: Element + ?Sized>(context: &C) -> Result<Self> {
        let document = context.node().document().ok_or(Error::DetachedContext)?;
        let node = XmlNode::new_element(&Self::qualified_tag(), &document)?;
        log::debug!("created <{}>", Self::qualified_tag());
        Ok(Self::from_node(node))
    }

    /// Build a new element and append it to `context`
    fn create_within<C: Element + ?Sized>(context: &C) -> Result<Self> {
        let mut element = Self::create_with(context)?;
        element.append_to(context)?;
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    #[derive(Debug)]
    struct Untagged {
        node: XmlNode,
    }

    impl Element for Untagged {
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

    impl ElementFactory for Untagged {
        const TAG: &'static str = "";
    }

    #[derive(Debug)]
    struct Plain {
        node: XmlNode,
    }

    impl Element for Plain {
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

    impl ElementFactory for Plain {
        const TAG: &'static str = "item";
        const NAMESPACE_PREFIX: &'static str = "";
    }

    #[test]
    fn test_empty_tag_cannot_be_constructed() {
        let doc = XmlDocument::parse("<w:body/>").unwrap();
        let body = Plain::from_node(doc.root().unwrap());
        assert!(matches!(
            Untagged::create_with(&body),
            Err(Error::InvalidTag(_))
        ));
    }

    #[test]
    fn test_unprefixed_tag() {
        assert_eq!(Plain::tag(), "item");
        assert_eq!(Plain::qualified_tag(), "item");

        let doc = XmlDocument::parse("<list/>").unwrap();
        let list = Plain::from_node(doc.root().unwrap());
        let item = Plain::create_within(&list).unwrap();
        assert_eq!(item.node().parent(), Some(list.node().clone()));
        assert!(doc.to_xml().unwrap().ends_with("<list><item/></list>"));
    }

    #[test]
    fn test_detached_context() {
        let doc = XmlDocument::parse("<list/>").unwrap();
        let orphan = doc.create_element("item").unwrap();
        drop(doc);

        let orphan = Plain::from_node(orphan);
        assert!(matches!(
            Plain::create_with(&orphan),
            Err(Error::DetachedContext)
        ));
    }

    #[test]
    fn test_prepend_into_empty_target() {
        let doc = XmlDocument::parse("<list/>").unwrap();
        let list = Plain::from_node(doc.root().unwrap());
        let mut item = Plain::create_with(&list).unwrap();
        item.prepend_to(&list).unwrap();
        assert_eq!(list.node().first_child(), Some(item.node().clone()));
    }
}
