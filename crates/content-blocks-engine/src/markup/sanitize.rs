//! Allow-list sanitizer for rich text.
//!
//! Rich text is parsed with the fragment parser and written back out tag by
//! tag. Allowed inline tags survive without attributes (links keep a
//! sanitized `href`, `target` and `rel`). Other tags are unwrapped, keeping
//! their content. `script` and `style` are removed with their content.
//! Text is written in canonical escaped form, so the sanitizer is a fixed
//! point: sanitizing its own output changes nothing.

use content_blocks_syntax::{Element, Node, parse};
use html_escape::decode_html_entities;

use super::escape::{escape_attribute, escape_text, sanitize_url};

const ALLOWED_TAGS: &[&str] = &[
    "strong", "b", "em", "i", "a", "br", "s", "del", "u", "sub", "sup", "code", "mark", "kbd",
    "span",
];
const DROPPED_WITH_CONTENT: &[&str] = &["script", "style"];
const LINK_TARGETS: &[&str] = &["_blank", "_self"];

pub fn sanitize_rich_text(input: &str) -> String {
    match parse(input) {
        Ok(nodes) => {
            let mut out = String::with_capacity(input.len());
            write_nodes(&nodes, input, &mut out);
            out
        }
        // Unparseable markup is kept as plain text
        Err(_) => escape_text(&decode_html_entities(input)),
    }
}

fn write_nodes(nodes: &[Node], source: &str, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(span) => {
                out.push_str(&escape_text(&decode_html_entities(span.slice(source))));
            }
            Node::Element(element) => write_element(element, source, out),
        }
    }
}

fn write_element(element: &Element, source: &str, out: &mut String) {
    let name = element.name.to_ascii_lowercase();
    if DROPPED_WITH_CONTENT.contains(&name.as_str()) {
        return;
    }
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        write_nodes(&element.children, source, out);
        return;
    }

    out.push('<');
    out.push_str(&name);
    if name == "a" {
        write_link_attributes(element, out);
    }
    if name == "br" {
        out.push_str(" />");
        return;
    }
    out.push('>');
    write_nodes(&element.children, source, out);
    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn write_link_attributes(element: &Element, out: &mut String) {
    for attribute in &element.attributes {
        let value = attribute.value.as_deref().unwrap_or("");
        let kept = match attribute.name.to_ascii_lowercase().as_str() {
            "href" => sanitize_url(value).map(|url| ("href", url)),
            "target" if LINK_TARGETS.contains(&value) => Some(("target", value.to_string())),
            "rel" => {
                let rel: String = value
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-'))
                    .collect();
                let rel = rel.split_whitespace().collect::<Vec<_>>().join(" ");
                (!rel.is_empty()).then_some(("rel", rel))
            }
            _ => None,
        };
        if let Some((name, value)) = kept {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(&value));
            out.push('"');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::plain("Hello world", "Hello world")]
    #[case::allowed("<strong>bold</strong> and <em>it</em>", "<strong>bold</strong> and <em>it</em>")]
    #[case::attributes_dropped("<span class=\"x\" onclick=\"y()\">s</span>", "<span>s</span>")]
    #[case::unwrapped("<div><p>para</p></div>", "para")]
    #[case::script("a<script>alert(1)</script>b", "ab")]
    #[case::style("<style>p{}</style>ok", "ok")]
    #[case::uppercase("<B>x</B>", "<b>x</b>")]
    #[case::br("a<br>b<BR/>c", "a<br />b<br />c")]
    #[case::stray_lt("1 < 2", "1 &lt; 2")]
    #[case::entities("Tom &amp; Jerry &gt;", "Tom &amp; Jerry &gt;")]
    #[case::unterminated("<b>x<i", "&lt;b&gt;x&lt;i")]
    #[case::unclosed("<b>bold", "&lt;b&gt;bold")]
    fn sanitizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_rich_text(input), expected);
    }

    #[rstest]
    #[case(
        "<a href=\"https://x.y\" target=\"_blank\" rel=\"noopener noreferrer\">l</a>",
        "<a href=\"https://x.y\" target=\"_blank\" rel=\"noopener noreferrer\">l</a>"
    )]
    #[case("<a href=\"javascript:alert(1)\">l</a>", "<a>l</a>")]
    #[case("<a href=\"/p\" target=\"_top\" title=\"t\">l</a>", "<a href=\"/p\">l</a>")]
    fn sanitizes_links(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_rich_text(input), expected);
    }

    #[rstest]
    #[case("<b>x</b> & <i>y</i>")]
    #[case("<div onclick=\"x\">a<script>b</script><br>c</div>")]
    #[case("<a href=\"a b\" rel=\" x  y \">z</a>")]
    #[case("<b>broken")]
    #[case("don't <b>stop</b> it's")]
    #[case("<div>hello </div>")]
    #[case("<script>x</script> hi")]
    #[case("&nbsp;indented")]
    fn is_idempotent(#[case] input: &str) {
        let once = sanitize_rich_text(input);
        assert_eq!(sanitize_rich_text(&once), once);
    }
}
