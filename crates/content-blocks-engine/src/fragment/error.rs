use std::fmt;

use content_blocks_syntax::SyntaxError;

use crate::schema::ValidationError;

/// Where a fragment sits in a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FragmentLocation {
    /// Zero-based index among the document's top-level fragments.
    pub ordinal: usize,
    /// Byte offset of the fragment's first byte.
    pub offset: usize,
}

impl fmt::Display for FragmentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} at byte {}", self.ordinal, self.offset)
    }
}

/// Why a fragment could not be hydrated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedReason {
    #[error("unparseable markup: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("root element carries no `cb-<name>` class")]
    NotAComponent,
    #[error("unknown component `{0}`")]
    UnknownComponent(String),
    #[error("expected a `{expected}` fragment")]
    UnexpectedComponent { expected: String },
    #[error("`{attribute}` is not a JSON object: {message}")]
    InvalidJson {
        attribute: &'static str,
        message: String,
    },
    #[error("required attributes unusable: {}", join(.0))]
    MissingRequired(Vec<ValidationError>),
    #[error("attributes contradict each other: {}", join(.0))]
    Inconsistent(Vec<ValidationError>),
    #[error("`{child}` is not allowed inside `{parent}`")]
    ChildNotAllowed { parent: String, child: String },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A stored fragment that could not be turned into an instance. No instance
/// is produced alongside it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("malformed fragment {location}{}: {reason}", .component.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
pub struct MalformedFragmentError {
    pub location: FragmentLocation,
    /// Component named by the fragment, when it could be read.
    pub component: Option<String>,
    pub reason: MalformedReason,
}

impl MalformedFragmentError {
    pub fn new(location: FragmentLocation, component: Option<&str>, reason: MalformedReason) -> Self {
        Self {
            location,
            component: component.map(str::to_string),
            reason,
        }
    }
}
