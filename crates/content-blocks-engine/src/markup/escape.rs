//! Context-specific escaping for values that flow into markup.

const URL_SAFE: &str = "-._~:/?#[]@!$&'()*+,;=%";
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];
const CSS_FORBIDDEN: &[&str] = &["expression(", "javascript:", "url("];

/// Text node content.
pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Normalise a CSS property name: camelCase becomes kebab-case and anything
/// outside `[a-z-]` is dropped.
pub fn css_property(name: &str) -> Option<String> {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_lowercase() || c == '-' {
            out.push(c);
        }
    }
    (!out.trim_matches('-').is_empty()).then_some(out)
}

/// Make a CSS value safe inside a `style` attribute.
///
/// Characters that could end the declaration or the attribute are stripped.
/// Values that could execute or fetch anything are dropped entirely.
pub fn css_value(value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    if CSS_FORBIDDEN.iter().any(|f| lower.contains(f)) {
        return None;
    }
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\'' | '\\'))
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Restrict a URL to `http`, `https`, `mailto`, `tel` or a relative form and
/// percent-encode anything unsafe. Returns `None` for a rejected URL.
///
/// Idempotent: feeding the output back in returns it unchanged.
pub fn sanitize_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    // Browsers ignore whitespace and control characters inside a scheme
    let compact: String = url
        .chars()
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .collect();
    if let Some(scheme) = scheme_of(&compact)
        && !ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str())
    {
        return None;
    }

    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        if c.is_ascii_alphanumeric() || URL_SAFE.contains(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    Some(out)
}

/// The scheme of an absolute URL: everything before the first `:` when no
/// `/`, `?` or `#` comes first.
fn scheme_of(url: &str) -> Option<&str> {
    let end = url.find([':', '/', '?', '#'])?;
    (url.as_bytes()[end] == b':').then(|| &url[..end])
}
