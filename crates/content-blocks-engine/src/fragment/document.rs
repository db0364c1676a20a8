use content_blocks_syntax::split_fragments;

use super::{FragmentLocation, MalformedFragmentError, hydrate, serialize};
use crate::component::Registry;
use crate::editing::EditableInstance;

/// Top-level fragments of a stored document with their locations.
pub fn fragments(text: &str) -> Vec<(FragmentLocation, &str)> {
    split_fragments(text)
        .into_iter()
        .enumerate()
        .map(|(ordinal, span)| {
            (
                FragmentLocation {
                    ordinal,
                    offset: span.start,
                },
                span.slice(text),
            )
        })
        .collect()
}

/// Hydrate every fragment of a stored document independently.
pub fn parse_document(
    text: &str,
    registry: &Registry,
) -> Vec<Result<EditableInstance, MalformedFragmentError>> {
    fragments(text)
        .into_iter()
        .map(|(location, source)| hydrate(source, location, None, registry))
        .collect()
}

/// Serialize instances as a stored document: fragments separated by a blank
/// line, ending with a newline.
pub fn serialize_document(instances: &[EditableInstance]) -> String {
    let mut out = instances
        .iter()
        .map(|instance| serialize(instance).into_string())
        .collect::<Vec<_>>()
        .join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::MalformedReason;
    use crate::tests::{create, registry};
    use serde_json::json;

    #[test]
    fn locates_each_fragment() {
        let doc = "<div class=\"cb-basic-text\"></div>\n\n  <div class=\"cb-unknown\"></div>\n";
        let located = fragments(doc);

        assert_eq!(located.len(), 2);
        assert_eq!(located[1].0, FragmentLocation { ordinal: 1, offset: 37 });
        assert_eq!(located[1].1, "<div class=\"cb-unknown\"></div>");
    }

    #[test]
    fn one_bad_fragment_does_not_hide_others() {
        let registry = registry();
        let good = serialize(&create("basic-text", json!({"content": "ok"}))).into_string();
        let doc = format!("{good}\n\n<div class=\"cb-basic-text\"><p>broken</span></div>\n\n{good}\n");

        let results = parse_document(&doc, &registry);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[2].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.location.ordinal, 1);
        assert!(matches!(err.reason, MalformedReason::Syntax(_)));
    }

    #[test]
    fn document_round_trip() {
        let registry = registry();
        let instances = vec![
            create("basic-text", json!({"content": "<b>one</b>"})),
            create("interactive-counter", json!({"initialValue": 3})),
        ];
        let doc = serialize_document(&instances);

        let back: Vec<_> = parse_document(&doc, &registry)
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(serialize_document(&back), doc);
        assert!(doc.ends_with("</div>\n"));
        assert_eq!(serialize_document(&[]), "");
    }
}
