//! # Bundled Blocks
//!
//! The three components shipped with the engine. Registration is explicit:
//! hosts call [`register_all`] (or [`Registry::with_blocks`]) themselves.
//!
//! [`Registry::with_blocks`]: crate::component::Registry::with_blocks

pub mod advanced_card;
pub mod basic_text;
pub mod interactive_counter;

use std::iter;
use std::sync::Arc;

use crate::component::{Host, RegistryError};
use crate::fragment::CLASS_PREFIX;
use crate::markup::{Element, Style};
use crate::schema::AttributeSet;

pub use advanced_card::{AdvancedCard, pick_image, remove_image};
pub use basic_text::BasicText;
pub use interactive_counter::InteractiveCounter;

pub(crate) const ALIGNMENTS: &[&str] = &["left", "center", "right"];

/// Register every bundled block with `host`.
pub fn register_all(host: &mut dyn Host) -> Result<(), RegistryError> {
    host.register_component(BasicText::NAME, Arc::new(BasicText::new()?))?;
    host.register_component(AdvancedCard::NAME, Arc::new(AdvancedCard::new()?))?;
    host.register_component(InteractiveCounter::NAME, Arc::new(InteractiveCounter::new()?))?;
    Ok(())
}

/// Wrapper element: `cb-<name>`, then variant classes, then the custom class.
pub(crate) fn wrapper<I>(name: &str, variants: I, custom_class: &str) -> Element
where
    I: IntoIterator<Item = String>,
{
    Element::new("div").class(
        iter::once(format!("{CLASS_PREFIX}{name}"))
            .chain(variants)
            .chain(iter::once(custom_class.to_string())),
    )
}

/// `color: <value>;` for an optional colour attribute.
pub(crate) fn color(attributes: &AttributeSet, field: &str) -> Style {
    let mut style = Style::new();
    style.push("color", attributes.string(field));
    style
}

/// `(label, value)` pairs for a select widget whose labels are the values
/// in title case.
pub(crate) fn titled(values: &[&'static str]) -> Vec<(String, String)> {
    values
        .iter()
        .map(|v| {
            let mut chars = v.chars();
            let label = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            (label, v.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Registry;
    use pretty_assertions::assert_eq;

    #[test]
    fn registers_three_blocks_once() {
        let mut registry = Registry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(matches!(
            register_all(&mut registry),
            Err(RegistryError::Duplicate(name)) if name == "basic-text"
        ));
    }

    #[test]
    fn wrapper_orders_classes() {
        let html = wrapper("demo", ["a-1".to_string(), "b-2".to_string()], "mine extra").to_html();
        assert_eq!(html, r#"<div class="cb-demo a-1 b-2 mine extra"></div>"#);
    }

    #[test]
    fn titles_values() {
        assert_eq!(
            titled(&["top", "x"]),
            vec![("Top".to_string(), "top".to_string()), ("X".to_string(), "x".to_string())]
        );
    }
}
