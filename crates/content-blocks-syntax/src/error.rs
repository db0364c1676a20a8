use thiserror::Error;

/// Structural problems found while parsing markup. Offsets are byte offsets
/// into the source that was handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("tag starting at byte {offset} is never terminated")]
    UnterminatedTag { offset: usize },

    #[error("unexpected {found:?} at byte {offset}")]
    UnexpectedToken { offset: usize, found: String },

    #[error("element <{name}> opened at byte {offset} is never closed")]
    Unclosed { name: String, offset: usize },

    #[error("closing tag </{found}> at byte {offset} does not match <{expected}>")]
    Mismatched {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("closing tag </{name}> at byte {offset} has no matching start tag")]
    StrayClose { name: String, offset: usize },

    #[error("expected exactly one root element, found {found}")]
    NotSingleRoot { found: usize },
}
