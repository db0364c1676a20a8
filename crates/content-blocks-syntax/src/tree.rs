use std::ops::Range;

/// Half-open byte range into the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Slice this span out of `source`.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        &source[self.range()]
    }
}

/// A parsed attribute. `value` is entity-decoded; `None` means the attribute
/// was written without a value (`<button disabled>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
    pub span: Span,
}

/// A node in the parsed markup.
///
/// Text is stored as a span, never as a decoded copy, so callers can slice
/// the exact source bytes back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Span),
}

/// A parsed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Whole element, start tag through end tag.
    pub span: Span,
    /// Between the end of the start tag and the start of the end tag.
    /// Empty for void and self-closing elements.
    pub content_span: Span,
}

impl Element {
    /// Attribute value by name. Valueless attributes read as `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Direct child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First descendant (depth-first, document order) carrying `class`.
    /// The element itself is not considered.
    pub fn find_class(&self, class: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.has_class(class) {
                return Some(child);
            }
            if let Some(found) = child.find_class(class) {
                return Some(found);
            }
        }
        None
    }

    /// Exact source of everything between the start and end tags.
    pub fn inner<'s>(&self, source: &'s str) -> &'s str {
        self.content_span.slice(source)
    }

    /// Exact source of the whole element.
    pub fn outer<'s>(&self, source: &'s str) -> &'s str {
        self.span.slice(source)
    }
}

/// Elements that never have content or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}
