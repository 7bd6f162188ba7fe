//! Table elements (w:tbl, w:tr, w:tc)

use crate::document::Paragraph;
use crate::element::{Element, ElementFactory, TagOptions};
use crate::xml::XmlNode;

/// Child elements of `node` wrapped as `T`
fn wrapped_children<T: ElementFactory>(node: &XmlNode) -> Vec<T> {
    let tag = T::qualified_tag();
    node.element_children()
        .into_iter()
        .filter(|c| c.has_name(&tag))
        .map(T::from_node)
        .collect()
}

/// Table (w:tbl)
#[derive(Clone, Debug)]
pub struct Table {
    node: XmlNode,
}

impl Element for Table {
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

impl ElementFactory for Table {
    const TAG: &'static str = "tbl";
}

impl Table {
    pub fn rows(&self) -> Vec<TableRow> {
        wrapped_children(&self.node)
    }

    pub fn row(&self, index: usize) -> Option<TableRow> {
        self.rows().into_iter().nth(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    /// Number of grid columns (w:tblGrid), falling back to the widest row
    pub fn column_count(&self) -> usize {
        match self.node.child_element("w:tblGrid") {
            Some(grid) => grid
                .element_children()
                .iter()
                .filter(|c| c.has_name("w:gridCol"))
                .count(),
            None => self
                .rows()
                .iter()
                .map(|row| row.cells().len())
                .max()
                .unwrap_or(0),
        }
    }

    /// Cells at `index` in every row that has one
    pub fn column(&self, index: usize) -> Vec<TableCell> {
        self.rows()
            .iter()
            .filter_map(|row| row.cell(index))
            .collect()
    }

    pub fn to_html(&self) -> String {
        let content: String = self.rows().iter().map(TableRow::to_html).collect();
        self.html_tag("table", &TagOptions::new().with_content(content))
    }
}

/// Table row (w:tr)
#[derive(Clone, Debug)]
pub struct TableRow {
    node: XmlNode,
}

impl Element for TableRow {
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

impl ElementFactory for TableRow {
    const TAG: &'static str = "tr";
}

impl TableRow {
    pub fn cells(&self) -> Vec<TableCell> {
        wrapped_children(&self.node)
    }

    pub fn cell(&self, index: usize) -> Option<TableCell> {
        self.cells().into_iter().nth(index)
    }

    pub fn to_html(&self) -> String {
        let content: String = self.cells().iter().map(TableCell::to_html).collect();
        self.html_tag("tr", &TagOptions::new().with_content(content))
    }
}

/// Table cell (w:tc)
#[derive(Clone, Debug)]
pub struct TableCell {
    node: XmlNode,
}

impl Element for TableCell {
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

impl ElementFactory for TableCell {
    const TAG: &'static str = "tc";
}

impl TableCell {
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        wrapped_children(&self.node)
    }

    /// Cell text, one line per paragraph
    pub fn text(&self) -> String {
        self.paragraphs()
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Grid span (horizontal merge), 1 when not merged
    pub fn grid_span(&self) -> u32 {
        self.node
            .properties()
            .and_then(|props| props.child_element("w:gridSpan"))
            .and_then(|span| span.attr("w:val"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
    }

    pub fn to_html(&self) -> String {
        let content: String = self.paragraphs().iter().map(Paragraph::to_html).collect();
        let mut options = TagOptions::new().with_content(content);
        let span = self.grid_span();
        if span > 1 {
            options = options.with_attribute("colspan", span.to_string());
        }
        self.html_tag("td", &options)
    }
}
