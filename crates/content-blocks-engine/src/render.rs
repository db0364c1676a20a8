//! Non-interactive rendering.
//!
//! [`render`] is a pure function of a component and a validated attribute
//! set. The serializer calls the same function, so a stored fragment and a
//! server-side render of its attributes are the same markup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::component::{Component, Registry};
use crate::fragment::{
    CONTEXT_ATTR, FragmentLocation, INTERACTIVE_ATTR, METADATA_ATTR, MalformedFragmentError,
    fragments, hydrate, serialize,
};
use crate::schema::{AttrSource, AttributeSet};

/// Render a component without children.
pub fn render(component: &dyn Component, attributes: &AttributeSet) -> String {
    render_with_inner(component, attributes, None)
}

/// Render a component with already-serialized children markup for its slot.
pub fn render_with_inner(
    component: &dyn Component,
    attributes: &AttributeSet,
    inner: Option<&str>,
) -> String {
    let mut context = Map::new();
    let mut metadata = Map::new();
    for field in component.schema().fields() {
        let Some(value) = attributes.get(field.name()) else {
            continue;
        };
        match field.source() {
            AttrSource::Context(key) => {
                context.insert(key.clone(), value.to_json());
            }
            AttrSource::Metadata if field.default_value() != Some(value) => {
                metadata.insert(field.name().to_string(), value.to_json());
            }
            _ => {}
        }
    }
    let has_context = component
        .schema()
        .fields()
        .iter()
        .any(|f| matches!(f.source(), AttrSource::Context(_)));

    let mut view = component.view(attributes, inner);
    if let Some(namespace) = component.interactive() {
        view = view.attr(INTERACTIVE_ATTR, namespace);
    }
    if has_context {
        view = view.attr(CONTEXT_ATTR, Value::Object(context).to_string());
    }
    if !metadata.is_empty() {
        view = view.attr(METADATA_ATTR, Value::Object(metadata).to_string());
    }
    view.to_html()
}

/// What [`render_document`] does with a fragment that fails to hydrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Render the component's defaults when the component is known.
    #[default]
    Defaults,
    /// Leave the fragment out.
    Drop,
    /// Leave the fragment out and hand its text back.
    Quarantine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quarantined {
    pub location: FragmentLocation,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedDocument {
    pub html: String,
    /// One entry per fragment that failed, in document order.
    pub failures: Vec<MalformedFragmentError>,
    pub quarantined: Vec<Quarantined>,
}

/// Render a stored document. Never fails: broken fragments are reported in
/// the result and handled according to `policy`.
pub fn render_document(text: &str, registry: &Registry, policy: FallbackPolicy) -> RenderedDocument {
    let mut parts = Vec::new();
    let mut failures = Vec::new();
    let mut quarantined = Vec::new();

    for (location, source) in fragments(text) {
        let error = match hydrate(source, location, None, registry) {
            Ok(instance) => {
                parts.push(serialize(&instance).into_string());
                continue;
            }
            Err(error) => error,
        };
        log::warn!("{error}");
        match policy {
            FallbackPolicy::Defaults => {
                let defaults = error
                    .component
                    .as_deref()
                    .and_then(|name| registry.get(name))
                    .and_then(|c| c.schema().defaults().ok().map(|attrs| render(c.as_ref(), &attrs)));
                parts.extend(defaults);
            }
            FallbackPolicy::Drop => {}
            FallbackPolicy::Quarantine => quarantined.push(Quarantined {
                location,
                text: source.to_string(),
            }),
        }
        failures.push(error);
    }

    RenderedDocument {
        html: parts.join("\n"),
        failures,
        quarantined,
    }
}
