//! # Markup Building
//!
//! Component views describe their output as an [`Element`] tree. Writing the
//! tree is the only place text becomes markup, so every value passes through
//! exactly one escaping routine for its context:
//!
//! | context | routine |
//! |---|---|
//! | text node | [`escape_text`] |
//! | attribute value | [`escape_attribute`] |
//! | rich text | [`sanitize_rich_text`] |
//! | `style` declaration | [`css_property`] / [`css_value`] via [`Style`] |
//! | URL attribute | [`sanitize_url`] |
//!
//! ```rust
//! use content_blocks_engine::markup::{Element, Style};
//!
//! let mut style = Style::new();
//! style.push("textAlign", "center");
//!
//! let html = Element::new("div")
//!     .class(["cb-demo", "variant"])
//!     .style(&style)
//!     .child(Element::new("p").text("a < b"))
//!     .to_html();
//!
//! assert_eq!(
//!     html,
//!     r#"<div class="cb-demo variant" style="text-align: center;"><p>a &lt; b</p></div>"#
//! );
//! ```

mod escape;
mod sanitize;

pub use escape::{css_property, css_value, escape_attribute, escape_text, sanitize_url};
pub use sanitize::sanitize_rich_text;

use content_blocks_syntax::is_void;
use serde_json::{Map, Value};

/// Child of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Escaped on write.
    Text(String),
    /// Written verbatim. Only sanitized or already-serialized markup.
    Raw(String),
}

/// An attribute. `None` writes a bare flag such as `disabled`.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub name: String,
    pub value: Option<String>,
}

/// Output element builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attrs: Vec<Attr>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Set an attribute, replacing an earlier value with the same name.
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, Some(value.into()));
        self
    }

    /// A valueless attribute.
    pub fn flag(mut self, name: &str) -> Self {
        self.set(name, None);
        self
    }

    /// Join the non-empty class tokens into a `class` attribute.
    pub fn class<I, S>(self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = classes
            .into_iter()
            .flat_map(|c| {
                c.as_ref()
                    .split_ascii_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self
        } else {
            self.attr("class", joined)
        }
    }

    /// Add a `style` attribute unless there are no declarations.
    pub fn style(self, style: &Style) -> Self {
        if style.is_empty() {
            self
        } else {
            self.attr("style", style.to_string())
        }
    }

    /// Add a URL attribute. Rejected URLs drop the attribute.
    pub fn url_attr(self, name: &str, url: &str) -> Self {
        match sanitize_url(url) {
            Some(url) => self.attr(name, url),
            None => self,
        }
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Append `child` when there is one.
    pub fn maybe_child(self, child: Option<Element>) -> Self {
        match child {
            Some(child) => self.child(child),
            None => self,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Rich text, sanitized on the way in.
    pub fn rich_text(mut self, markup: &str) -> Self {
        self.children.push(Node::Raw(sanitize_rich_text(markup)));
        self
    }

    /// Markup that is already safe, such as serialized child fragments.
    pub fn raw(mut self, markup: impl Into<String>) -> Self {
        self.children.push(Node::Raw(markup.into()));
        self
    }

    /// Apply `f` only when `condition` holds.
    pub fn when(self, condition: bool, f: impl FnOnce(Self) -> Self) -> Self {
        if condition { f(self) } else { self }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
        }
        if is_void(&self.name) {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_html(out),
                Node::Text(t) => out.push_str(&escape_text(t)),
                Node::Raw(r) => out.push_str(r),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    fn set(&mut self, name: &str, value: Option<String>) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attrs.push(Attr {
                name: name.to_string(),
                value,
            }),
        }
    }
}

/// Inline CSS declarations, written as `property: value;` joined by spaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration. Unsafe or empty names and values are skipped.
    pub fn push(&mut self, property: &str, value: &str) -> &mut Self {
        if let (Some(property), Some(value)) = (css_property(property), css_value(value)) {
            self.declarations.push((property, value));
        }
        self
    }

    pub fn push_px(&mut self, property: &str, px: i64) -> &mut Self {
        self.push(property, &format!("{px}px"))
    }

    /// Add every non-empty string entry of a structured style attribute.
    pub fn extend_structured(&mut self, map: Option<&Map<String, Value>>) -> &mut Self {
        for (property, value) in map.into_iter().flatten() {
            if let Value::String(value) = value {
                self.push(property, value);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (property, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{property}: {value};")?;
        }
        Ok(())
    }
}
