//! # Parser - Markup to Span-Preserving Tree
//!
//! Running text is scanned with a [`Cursor`]; every `<name` or `</name` hands
//! over to [`scan_tag`], which lexes exactly one tag with the
//! [`TagLexer`](crate::lexer::TagLexer). Elements are assembled on an explicit
//! stack, so nesting depth never touches the call stack.
//!
//! Every node keeps its byte span. [`Element::inner`] returns the exact source
//! between the start and end tags, which is what makes stored rich text
//! round-trip byte for byte.

use crate::cursor::Cursor;
use crate::error::SyntaxError;
use crate::lexer::{TagLexer, Token, TokenKind};
use crate::tree::{Attribute, Element, Node, Span, is_void};

/// One scanned tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Open {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
}

/// A tag together with the bytes it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTag {
    pub tag: Tag,
    pub span: Span,
}

struct Frame {
    name: String,
    attributes: Vec<Attribute>,
    start: usize,
    content_start: usize,
    children: Vec<Node>,
}

/// Parse a sequence of nodes.
pub fn parse(source: &str) -> Result<Vec<Node>, SyntaxError> {
    let mut roots = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut cur = Cursor::new(source, 0);
    let mut text_start = 0;

    while !cur.eof() {
        if !cur.at_tag() {
            cur.bump();
            continue;
        }

        let tag_start = cur.i;
        push_text(current(&mut stack, &mut roots), text_start, tag_start);

        let scanned = scan_tag(source, tag_start)?;
        match scanned.tag {
            Tag::Open {
                name,
                attributes,
                self_closing,
            } => {
                if self_closing || is_void(&name) {
                    let end = scanned.span.end;
                    current(&mut stack, &mut roots).push(Node::Element(Element {
                        name,
                        attributes,
                        children: Vec::new(),
                        span: scanned.span,
                        content_span: Span::new(end, end),
                    }));
                } else {
                    stack.push(Frame {
                        name,
                        attributes,
                        start: tag_start,
                        content_start: scanned.span.end,
                        children: Vec::new(),
                    });
                }
            }
            Tag::Close { name } => {
                let Some(frame) = stack.pop() else {
                    return Err(SyntaxError::StrayClose {
                        name,
                        offset: tag_start,
                    });
                };
                if !frame.name.eq_ignore_ascii_case(&name) {
                    return Err(SyntaxError::Mismatched {
                        expected: frame.name,
                        found: name,
                        offset: tag_start,
                    });
                }
                current(&mut stack, &mut roots).push(Node::Element(Element {
                    name: frame.name,
                    attributes: frame.attributes,
                    children: frame.children,
                    span: Span::new(frame.start, scanned.span.end),
                    content_span: Span::new(frame.content_start, tag_start),
                }));
            }
        }

        cur.jump(scanned.span.end);
        text_start = cur.i;
    }

    push_text(current(&mut stack, &mut roots), text_start, source.len());

    if let Some(frame) = stack.pop() {
        return Err(SyntaxError::Unclosed {
            name: frame.name,
            offset: frame.start,
        });
    }

    Ok(roots)
}

/// Parse markup that must consist of exactly one element, optionally
/// surrounded by whitespace.
pub fn parse_element(source: &str) -> Result<Element, SyntaxError> {
    let mut elements = Vec::new();
    let mut stray_text = 0;

    for node in parse(source)? {
        match node {
            Node::Element(element) => elements.push(element),
            Node::Text(span) if span.slice(source).trim().is_empty() => {}
            Node::Text(_) => stray_text += 1,
        }
    }

    match elements.pop() {
        Some(element) if elements.is_empty() && stray_text == 0 => Ok(element),
        last => Err(SyntaxError::NotSingleRoot {
            found: elements.len() + usize::from(last.is_some()) + stray_text,
        }),
    }
}

/// Split a stored document into top-level fragment spans.
///
/// This never fails: it only tracks nesting depth, so a broken fragment
/// still gets its own span (an unterminated tag swallows the rest of the
/// input) and is reported when that span is parsed on its own.
pub fn split_fragments(source: &str) -> Vec<Span> {
    let mut out = Vec::new();
    let mut cur = Cursor::new(source, 0);
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    while !cur.eof() {
        if cur.at_tag() {
            let at = cur.i;
            let Ok(scanned) = scan_tag(source, at) else {
                out.push(trim_end(source, start.unwrap_or(at), source.len()));
                return out;
            };
            let begin = *start.get_or_insert(at);
            match &scanned.tag {
                Tag::Open {
                    name, self_closing, ..
                } if !(*self_closing || is_void(name)) => depth += 1,
                Tag::Open { .. } => {}
                Tag::Close { .. } => depth = depth.saturating_sub(1),
            }
            cur.jump(scanned.span.end);
            if depth == 0 {
                out.push(Span::new(begin, cur.i));
                start = None;
            }
            continue;
        }

        if start.is_none() && !cur.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            start = Some(cur.i);
        }
        cur.bump();

        // Stray top-level text ends at the next tag
        if depth == 0
            && let Some(s) = start
            && (cur.eof() || cur.at_tag())
        {
            out.push(trim_end(source, s, cur.i));
            start = None;
        }
    }

    if let Some(s) = start {
        out.push(trim_end(source, s, source.len()));
    }

    out
}

/// Scan the single tag that starts at byte `at` (which must be a `<`).
pub fn scan_tag(source: &str, at: usize) -> Result<ScannedTag, SyntaxError> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    for token in TagLexer::new(source, at) {
        let kind = token.kind;
        tokens.push(token);
        if matches!(kind, TokenKind::Gt | TokenKind::SlashGt) {
            break;
        }
    }

    let Some(last) = tokens.last() else {
        return Err(SyntaxError::UnterminatedTag { offset: at });
    };
    if !matches!(last.kind, TokenKind::Gt | TokenKind::SlashGt) {
        return Err(SyntaxError::UnterminatedTag { offset: at });
    }
    let span = Span::new(at, last.span.end);
    let self_closing = last.kind == TokenKind::SlashGt;

    let name = match tokens.get(1) {
        Some(t) if t.kind == TokenKind::Name => t.text.to_string(),
        other => return Err(unexpected(other, span.end)),
    };
    // Tokens between the name and the closing `>` / `/>`
    let body = &tokens[2..tokens.len() - 1];

    if tokens[0].kind == TokenKind::LtSlash {
        if let Some(extra) = body.iter().find(|t| t.kind != TokenKind::Whitespace) {
            return Err(unexpected(Some(extra), span.end));
        }
        if self_closing {
            return Err(unexpected(tokens.last(), span.end));
        }
        return Ok(ScannedTag {
            tag: Tag::Close { name },
            span,
        });
    }

    Ok(ScannedTag {
        tag: Tag::Open {
            name,
            attributes: scan_attributes(body, span.end)?,
            self_closing,
        },
        span,
    })
}

fn scan_attributes(body: &[Token<'_>], end: usize) -> Result<Vec<Attribute>, SyntaxError> {
    let mut attributes = Vec::new();
    let mut i = 0;

    while i < body.len() {
        let token = &body[i];
        match token.kind {
            TokenKind::Whitespace => i += 1,
            TokenKind::Name => {
                let eq = skip_whitespace(body, i + 1);
                if body.get(eq).is_some_and(|t| t.kind == TokenKind::Eq) {
                    let v = skip_whitespace(body, eq + 1);
                    let value = match body.get(v) {
                        Some(t) if t.kind == TokenKind::DoubleQuoted
                            || t.kind == TokenKind::SingleQuoted =>
                        {
                            &t.text[1..t.text.len() - 1]
                        }
                        Some(t) if t.kind == TokenKind::Name => t.text,
                        other => return Err(unexpected(other, end)),
                    };
                    attributes.push(Attribute {
                        name: token.text.to_string(),
                        value: Some(html_escape::decode_html_entities(value).into_owned()),
                        span: Span::new(token.span.start, body[v].span.end),
                    });
                    i = v + 1;
                } else {
                    attributes.push(Attribute {
                        name: token.text.to_string(),
                        value: None,
                        span: Span::new(token.span.start, token.span.end),
                    });
                    i += 1;
                }
            }
            _ => return Err(unexpected(Some(token), end)),
        }
    }

    Ok(attributes)
}

fn skip_whitespace(body: &[Token<'_>], mut i: usize) -> usize {
    while body.get(i).is_some_and(|t| t.kind == TokenKind::Whitespace) {
        i += 1;
    }
    i
}

fn unexpected(token: Option<&Token<'_>>, fallback_offset: usize) -> SyntaxError {
    match token {
        Some(t) => SyntaxError::UnexpectedToken {
            offset: t.span.start,
            found: t.text.to_string(),
        },
        None => SyntaxError::UnterminatedTag {
            offset: fallback_offset,
        },
    }
}

fn current<'v>(stack: &'v mut [Frame], roots: &'v mut Vec<Node>) -> &'v mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => roots,
    }
}

fn push_text(nodes: &mut Vec<Node>, start: usize, end: usize) {
    if end > start {
        nodes.push(Node::Text(Span::new(start, end)));
    }
}

fn trim_end(source: &str, start: usize, end: usize) -> Span {
    let trimmed = source[start..end].trim_end();
    Span::new(start, start + trimmed.len())
}
