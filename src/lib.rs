//! # docx-elements
//!
//! Structural element layer for WordprocessingML (`word/document.xml`) trees.
//!
//! ## Features
//!
//! - Shared, mutable XML tree with parent links and a location-path subset
//! - [`Element`] capability: navigation, insertion, copying and HTML previews
//! - [`ElementFactory`]: build wrappers from the tag they stand for
//! - Paragraph, run, table and bookmark wrappers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docx_elements::{Document, Element};
//!
//! let doc = Document::parse(&std::fs::read_to_string("document.xml")?)?;
//!
//! for para in doc.paragraphs() {
//!     println!("{}", para.text());
//! }
//!
//! if let Some(mut mark) = doc.bookmark("address") {
//!     mark.insert_multiple_lines(&["221B Baker Street", "London"])?;
//! }
//! std::fs::write("document.xml", doc.to_xml()?)?;
//! ```

pub mod document;
pub mod element;
pub mod error;
pub mod xml;

pub use document::{
    BlockContent, Body, Bookmark, Document, Paragraph, Table, TableCell, TableRow, Text, TextRun,
};
pub use element::{html_tag, Element, ElementFactory, TagOptions};
pub use error::{Error, Result};
pub use xml::{ParseOptions, XmlDocument, XmlNode};
