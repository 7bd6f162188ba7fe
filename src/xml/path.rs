//! XPath queries over [`XmlNode`] trees
//!
//! The tree holding the context node is mirrored into an `sxd_document`
//! package and the expression is evaluated there with `sxd_xpath`; matched
//! nodes are mapped back to their [`XmlNode`] handles in document order.
//!
//! Every prefix is bound to one fixed URI (the WordprocessingML ones for the
//! usual prefixes, a synthetic one otherwise), so `w:p` in a path matches
//! exactly the elements named `w:p`, with or without `xmlns` declarations.

use std::collections::HashMap;

use sxd_document::{dom, Package, QName};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};

use super::namespace::{A, PIC, R, W, WP};
use super::node::{NodeKind, XmlNode};
use crate::error::{Error, Result};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Fixed prefix bindings shared by the mirrored tree and the evaluation
/// context
struct Prefixes {
    uris: HashMap<String, String>,
}

impl Prefixes {
    fn new() -> Self {
        let uris = [("w", W), ("r", R), ("wp", WP), ("a", A), ("pic", PIC), ("xml", XML_NS)]
            .into_iter()
            .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
            .collect();
        Self { uris }
    }

    /// Bind every prefix used by an element or attribute name under `node`
    fn collect(&mut self, node: &XmlNode) {
        if let NodeKind::Element { name, attributes } = node.kind() {
            let names = std::iter::once(name).chain(attributes.into_iter().map(|(key, _)| key));
            for name in names {
                if let Some((prefix, _)) = name.split_once(':') {
                    if prefix != "xmlns" && !self.uris.contains_key(prefix) {
                        self.uris
                            .insert(prefix.to_string(), format!("urn:docx-elements:{prefix}"));
                    }
                }
            }
        }
        for child in node.element_children() {
            self.collect(&child);
        }
    }

    fn qname<'a>(&'a self, name: &'a str) -> QName<'a> {
        match name.split_once(':') {
            Some((prefix, local)) => {
                QName::with_namespace_uri(self.uris.get(prefix).map(String::as_str), local)
            }
            None => QName::from(name),
        }
    }

    fn context<'d>(&self) -> Context<'d> {
        let mut context = Context::new();
        for (prefix, uri) in &self.uris {
            context.set_namespace(prefix, uri);
        }
        context
    }
}

/// Evaluate `expr` with `context` as the context node
pub(crate) fn select(context: &XmlNode, expr: &str) -> Result<Vec<XmlNode>> {
    let invalid = |reason: String| Error::InvalidPath {
        path: expr.to_string(),
        reason,
    };

    let xpath = Factory::new()
        .build(expr)
        .map_err(|e| invalid(e.to_string()))?
        .ok_or_else(|| invalid("empty path".into()))?;

    let top = context.ancestors().pop().unwrap_or_else(|| context.clone());
    let mut prefixes = Prefixes::new();
    prefixes.collect(&top);

    let package = Package::new();
    let document = package.as_document();
    let mut mirrored = HashMap::new();
    let root = mirror_element(&document, &top, &prefixes, &mut mirrored);
    document.root().append_child(root);

    let start = mirrored
        .iter()
        .find(|(_, node)| node.same_node(context))
        .map(|(mirror, _)| *mirror)
        .ok_or_else(|| invalid("context node is not an element, text or comment".into()))?;

    log::trace!("evaluating {expr:?} from <{}>", context.describe());
    let value = xpath
        .evaluate(&prefixes.context(), start)
        .map_err(|e| invalid(e.to_string()))?;

    let nodes = match value {
        Value::Nodeset(nodes) => nodes.document_order(),
        _ => return Err(invalid("expression does not select nodes".into())),
    };
    // Root and attribute nodes have no handle and are left out
    let selected = nodes
        .into_iter()
        .filter_map(|node| mirrored.get(&node).cloned())
        .collect();
    Ok(selected)
}

/// Copy `node` and its subtree into `document`, recording each copy
fn mirror_element<'d>(
    document: &dom::Document<'d>,
    node: &XmlNode,
    prefixes: &Prefixes,
    mirrored: &mut HashMap<Node<'d>, XmlNode>,
) -> dom::Element<'d> {
    let name = node.name().unwrap_or_default();
    let element = document.create_element(prefixes.qname(&name));
    for (key, value) in node.attributes() {
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        element.set_attribute_value(prefixes.qname(&key), &value);
    }
    mirrored.insert(element.into(), node.clone());

    for child in node.children() {
        match child.kind() {
            NodeKind::Element { .. } => {
                let copy = mirror_element(document, &child, prefixes, mirrored);
                element.append_child(copy);
            }
            NodeKind::Text(text) => {
                let copy = document.create_text(&text);
                element.append_child(copy);
                mirrored.insert(copy.into(), child);
            }
            NodeKind::Comment(text) => {
                let copy = document.create_comment(&text);
                element.append_child(copy);
                mirrored.insert(copy.into(), child);
            }
        }
    }
    element
}
