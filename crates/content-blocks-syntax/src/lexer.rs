//! # Lexer - Tokenizing Tag Interiors
//!
//! This module tokenizes the inside of markup tags using the [Logos] lexer
//! generator. Text between tags never reaches the lexer: the parser scans it
//! with a [`Cursor`](crate::cursor::Cursor) and only hands the lexer the
//! region that starts at a `<`.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte of the input appears in exactly one token. Bytes that match no
//! rule come out as [`TokenKind::Unknown`] rather than being dropped:
//!
//! ```
//! use content_blocks_syntax::lexer::lex;
//!
//! let input = r#"<div class="a" hidden>"#;
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Why Only Tag Interiors?
//!
//! Quotes and `=` mean something inside a tag and nothing in running text.
//! Lexing text like `don't <b>stop</b> it's` with the tag rules would glue the
//! two apostrophes into one quoted token that swallows the `<b>` element.
//! Keeping the lexer in tag mode keeps every token rule context-free.

use std::ops::Range;

use logos::Logos;

/// Token kinds produced inside a tag.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Spaces, tabs, line endings
    #[regex(r"[ \t\r\n\x0C]+")]
    Whitespace,

    /// `</` opening a closing tag
    #[token("</")]
    LtSlash,

    /// `<` opening a start tag
    #[token("<")]
    Lt,

    /// `/>` ending a self-closing tag
    #[token("/>")]
    SlashGt,

    /// `>` ending a tag
    #[token(">")]
    Gt,

    /// `=` between an attribute name and its value
    #[token("=")]
    Eq,

    /// `"..."` attribute value
    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    /// `'...'` attribute value
    #[regex(r"'[^']*'")]
    SingleQuoted,

    /// Tag or attribute name (also accepted as an unquoted value)
    #[regex(r"[A-Za-z_:][A-Za-z0-9_:.\-]*")]
    Name,

    /// Anything the rules above do not match
    Unknown,
}

/// A lexed token with its kind, text slice and absolute byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Range<usize>,
}

/// Streaming tag lexer that reports spans relative to the full source.
pub struct TagLexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    base: usize,
}

impl<'a> TagLexer<'a> {
    /// Start lexing `source` at byte offset `at`.
    pub fn new(source: &'a str, at: usize) -> Self {
        Self {
            inner: TokenKind::lexer(&source[at..]),
            base: at,
        }
    }
}

impl<'a> Iterator for TagLexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let kind = result.unwrap_or(TokenKind::Unknown);
        Some(Token {
            kind,
            text: self.inner.slice(),
            span: (span.start + self.base)..(span.end + self.base),
        })
    }
}

/// Lex the whole input in tag mode.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    TagLexer::new(input, 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_start_tag() {
        assert_eq!(
            kinds("<div>"),
            vec![TokenKind::Lt, TokenKind::Name, TokenKind::Gt]
        );
    }

    #[test]
    fn lex_close_tag() {
        assert_eq!(
            kinds("</div >"),
            vec![
                TokenKind::LtSlash,
                TokenKind::Name,
                TokenKind::Whitespace,
                TokenKind::Gt
            ]
        );
    }

    #[test]
    fn lex_attributes() {
        assert_eq!(
            kinds(r#"<a href="/x" target='_blank' hidden>"#),
            vec![
                TokenKind::Lt,
                TokenKind::Name,
                TokenKind::Whitespace,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::DoubleQuoted,
                TokenKind::Whitespace,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::SingleQuoted,
                TokenKind::Whitespace,
                TokenKind::Name,
                TokenKind::Gt,
            ]
        );
    }

    #[test]
    fn lex_self_closing() {
        assert_eq!(
            kinds("<br />"),
            vec![
                TokenKind::Lt,
                TokenKind::Name,
                TokenKind::Whitespace,
                TokenKind::SlashGt
            ]
        );
    }

    #[test]
    fn lex_data_attribute_names() {
        let tokens = lex("data-cb-context");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Name);
    }

    #[test]
    fn unmatched_bytes_become_unknown() {
        let tokens = lex("<a 1>");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Unknown));
    }

    #[test]
    fn all_bytes_preserved() {
        let input = r#"<div class="cb-basic-text" style="color: red;" data-x='{"a":1}'>"#;
        let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn spans_are_absolute() {
        let source = "text <p class=\"x\">";
        for token in TagLexer::new(source, 5) {
            assert_eq!(token.text, &source[token.span.clone()]);
        }
    }
}
