//! XML tree engine: shared nodes, parsing, serialization and path queries

mod namespace;
mod node;
mod path;
mod tree;

pub use namespace::*;
pub use node::{NodeKind, XmlNode};
pub use tree::{ParseOptions, XmlDocument};

/// Interpret an OOXML toggle value (missing, "1", "true" or "on" mean enabled)
pub fn is_toggle_on(value: Option<&str>) -> bool {
    match value {
        None => true, // No val attribute means true (e.g., <w:b/>)
        Some(v) => matches!(v, "1" | "true" | "on"),
    }
}
