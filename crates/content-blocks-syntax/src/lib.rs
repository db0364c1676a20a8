//! # content-blocks-syntax
//!
//! Lexer and span-preserving parser for the markup that block fragments are
//! persisted as.
//!
//! ## Why Spans?
//!
//! A persisted fragment carries rich text as raw inner markup. To load it
//! and save it back unchanged, the parser never copies or normalises text:
//! every [`Node`] records the byte range it came from, and
//! [`Element::inner`] slices the exact source between a start tag and its
//! end tag.
//!
//! ## Pipeline
//!
//! ```text
//! Source Text → Cursor (text) ─┐
//!                              ├→ parse() → Vec<Node>
//!      '<' → TagLexer (Logos) ─┘
//! ```
//!
//! - [`lexer`] tokenizes tag interiors only (names, `=`, quoted values).
//! - [`cursor`] walks running text byte by byte looking for the next tag.
//! - [`parser`] builds [`Element`]s on an explicit stack and reports
//!   structural problems as [`SyntaxError`].
//!
//! Attribute values are entity-decoded with `html-escape`, so a JSON payload
//! stored in `data-cb-context="{&quot;value&quot;:3}"` reads back as
//! `{"value":3}`.
//!
//! ## Quick Start
//!
//! ```
//! use content_blocks_syntax::parse_element;
//!
//! let src = r#"<div class="cb-basic-text"><p class="basic-text-content">Hi <b>there</b></p></div>"#;
//! let root = parse_element(src).unwrap();
//!
//! assert!(root.has_class("cb-basic-text"));
//! let content = root.find_class("basic-text-content").unwrap();
//! assert_eq!(content.inner(src), "Hi <b>there</b>");
//! ```
//!
//! ## Documents
//!
//! A stored document is a sequence of fragments. [`split_fragments`] finds
//! their boundaries without failing, so one broken fragment never hides the
//! ones around it.

pub mod cursor;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod tree;

pub use error::SyntaxError;
pub use parser::{parse, parse_element, split_fragments};
pub use tree::{Attribute, Element, Node, Span, is_void};
