//! Minimal HTML fragments for lightweight previews

use quick_xml::escape::escape;

/// Content, attributes and inline styles for [`html_tag`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagOptions {
    content: Option<String>,
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
}

impl TagOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body of the tag. Inserted verbatim, callers escape text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Add a plain attribute, rendered before `style`
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add an inline CSS property
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_style(property, value);
        self
    }

    /// Add an inline CSS property. Setting a property twice keeps its
    /// original position and replaces the value.
    pub fn push_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.styles.iter_mut().find(|(p, _)| *p == property) {
            Some(existing) => existing.1 = value,
            None => self.styles.push((property, value)),
        }
    }

    pub fn has_styles(&self) -> bool {
        !self.styles.is_empty()
    }
}

/// Render `<name style="prop:value;...">content</name>`.
///
/// The style attribute is omitted without styles and the tag is never
/// self-closing. Attribute values, styles included, are escaped; content is not.
pub fn html_tag(name: &str, options: &TagOptions) -> String {
    let mut html = format!("<{name}");
    for (attr, value) in &options.attributes {
        html.push_str(&format!(" {attr}=\"{}\"", escape(value.as_str())));
    }
    if !options.styles.is_empty() {
        let style: String = options
            .styles
            .iter()
            .map(|(property, value)| format!("{property}:{value};"))
            .collect();
        html.push_str(&format!(" style=\"{}\"", escape(style.as_str())));
    }
    html.push('>');
    if let Some(content) = &options.content {
        html.push_str(content);
    }
    html.push_str("</");
    html.push_str(name);
    html.push('>');
    html
}
