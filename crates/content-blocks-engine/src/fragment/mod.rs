//! # Fragment Codec
//!
//! Turns an [`EditableInstance`] into its persisted markup and back.
//!
//! ## Format
//!
//! A fragment is the component's view markup with generic data attributes
//! added to the wrapper element:
//!
//! ```text
//! <div class="cb-<name> <variant classes> <custom class>"
//!      style="property: value; ..."
//!      data-cb-interactive="<namespace>"      (interactive components only)
//!      data-cb-context="{...}"                (context fields, always emitted)
//!      data-cb-attributes="{...}">            (metadata differing from defaults)
//!   ... view markup, rich text inside its classed elements,
//!       child fragments inside the children slot ...
//! </div>
//! ```
//!
//! JSON objects follow schema declaration order, so serializing is
//! deterministic and `serialize(deserialize(f)) == f` for every `f` that
//! `serialize` produced.
//!
//! ## Hydration
//!
//! Reading a fragment is lenient at the field level and strict at the
//! structural level. An unknown or missing attribute takes its default and a
//! bad value is replaced by its default with a logged warning. Markup that
//! does not parse, an unknown component, broken JSON or a disallowed child
//! fails the whole fragment with a [`MalformedFragmentError`]. An instance is
//! never partially populated.

mod document;
mod error;

use std::fmt;

use content_blocks_syntax::parser::{Tag, scan_tag};
use content_blocks_syntax::{Element, parse_element};
use serde_json::{Map, Value};

use crate::component::Registry;
use crate::editing::EditableInstance;
use crate::render::render_with_inner;
use crate::schema::AttrSource;

pub use document::{fragments, parse_document, serialize_document};
pub use error::{FragmentLocation, MalformedFragmentError, MalformedReason};

pub const CONTEXT_ATTR: &str = "data-cb-context";
pub const METADATA_ATTR: &str = "data-cb-attributes";
pub const INTERACTIVE_ATTR: &str = "data-cb-interactive";
pub const CLASS_PREFIX: &str = "cb-";

/// Serialized markup of one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFragment(String);

impl PersistedFragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for PersistedFragment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersistedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialize an instance and its children.
pub fn serialize(instance: &EditableInstance) -> PersistedFragment {
    let component = instance.component();
    let inner = component.children_slot().map(|_| {
        instance
            .children()
            .iter()
            .map(|child| serialize(child).0)
            .collect::<String>()
    });
    PersistedFragment(render_with_inner(
        component.as_ref(),
        instance.attributes(),
        inner.as_deref(),
    ))
}

/// Hydrate one fragment, finding the component from its wrapper class.
pub fn deserialize(
    text: &str,
    registry: &Registry,
) -> Result<EditableInstance, MalformedFragmentError> {
    hydrate(text, FragmentLocation::default(), None, registry)
}

/// Hydrate one fragment that must belong to `component`.
pub fn deserialize_as(
    text: &str,
    component: &str,
    registry: &Registry,
) -> Result<EditableInstance, MalformedFragmentError> {
    hydrate(text, FragmentLocation::default(), Some(component), registry)
}

/// Outcome of [`deserialize_or_default`].
#[derive(Debug)]
pub enum Hydrated {
    Exact(EditableInstance),
    /// The fragment was malformed; the instance holds the component defaults.
    Defaulted {
        instance: EditableInstance,
        error: MalformedFragmentError,
    },
}

impl Hydrated {
    pub fn instance(&self) -> &EditableInstance {
        match self {
            Hydrated::Exact(instance) | Hydrated::Defaulted { instance, .. } => instance,
        }
    }

    pub fn into_instance(self) -> EditableInstance {
        match self {
            Hydrated::Exact(instance) | Hydrated::Defaulted { instance, .. } => instance,
        }
    }

    pub fn error(&self) -> Option<&MalformedFragmentError> {
        match self {
            Hydrated::Exact(_) => None,
            Hydrated::Defaulted { error, .. } => Some(error),
        }
    }
}

/// Hydrate a fragment declared to be `component`, replacing a malformed one
/// with a whole-default instance. Fails only when not even the defaults can
/// be built.
pub fn deserialize_or_default(
    text: &str,
    component: &str,
    registry: &Registry,
) -> Result<Hydrated, MalformedFragmentError> {
    match deserialize_as(text, component, registry) {
        Ok(instance) => Ok(Hydrated::Exact(instance)),
        Err(error) => {
            let Some(found) = registry.get(component) else {
                return Err(error);
            };
            match EditableInstance::create(found) {
                Ok(instance) => {
                    log::warn!("{error}; using defaults");
                    Ok(Hydrated::Defaulted { instance, error })
                }
                Err(_) => Err(error),
            }
        }
    }
}

/// The component a fragment claims to be, read from its first tag without
/// parsing the rest.
pub fn declared_component(text: &str) -> Option<String> {
    let start = text.find('<')?;
    let Tag::Open { attributes, .. } = scan_tag(text, start).ok()?.tag else {
        return None;
    };
    let classes = attributes.iter().find(|a| a.name == "class")?.value.as_deref()?;
    component_name(classes.split_ascii_whitespace().next()?).map(str::to_string)
}

pub(crate) fn hydrate(
    source: &str,
    location: FragmentLocation,
    expected: Option<&str>,
    registry: &Registry,
) -> Result<EditableInstance, MalformedFragmentError> {
    let root = parse_element(source).map_err(|e| {
        MalformedFragmentError::new(location, declared_component(source).as_deref(), e.into())
    })?;
    hydrate_element(source, &root, location, expected, registry)
}

fn hydrate_element(
    source: &str,
    element: &Element,
    location: FragmentLocation,
    expected: Option<&str>,
    registry: &Registry,
) -> Result<EditableInstance, MalformedFragmentError> {
    let name = element
        .classes()
        .next()
        .and_then(component_name)
        .ok_or_else(|| MalformedFragmentError::new(location, None, MalformedReason::NotAComponent))?;
    let fail = |reason| MalformedFragmentError::new(location, Some(name), reason);

    if let Some(expected) = expected
        && expected != name
    {
        return Err(fail(MalformedReason::UnexpectedComponent {
            expected: expected.to_string(),
        }));
    }
    let component = registry
        .get(name)
        .ok_or_else(|| fail(MalformedReason::UnknownComponent(name.to_string())))?;
    let schema = component.schema();

    let mut raw = Map::new();
    for (key, value) in json_attr(element, CONTEXT_ATTR).map_err(fail)? {
        match schema.context_field(&key) {
            Some(field) => {
                raw.insert(field.name().to_string(), value);
            }
            None => log::debug!("`{name}` ignores unknown context key `{key}`"),
        }
    }
    for (key, value) in json_attr(element, METADATA_ATTR).map_err(fail)? {
        match schema.field(&key) {
            Some(field) if *field.source() == AttrSource::Metadata => {
                raw.insert(key, value);
            }
            _ => log::debug!("`{name}` ignores unknown metadata key `{key}`"),
        }
    }
    for field in schema.fields() {
        let AttrSource::Markup(class) = field.source() else {
            continue;
        };
        match element.find_class(class) {
            Some(holder) => {
                raw.insert(
                    field.name().to_string(),
                    Value::String(holder.inner(source).to_string()),
                );
            }
            None => log::debug!("`{name}` has no `.{class}` element, `{}` takes its default", field.name()),
        }
    }

    let (attributes, warnings) = schema
        .validate_lenient(&raw)
        .map_err(|errors| fail(MalformedReason::MissingRequired(errors)))?;
    component
        .check(&attributes)
        .map_err(|errors| fail(MalformedReason::Inconsistent(errors)))?;
    for warning in &warnings {
        log::warn!("fragment {location} ({name}): {warning}; using the default");
    }

    let mut children = Vec::new();
    if let Some(slot) = component.children_slot()
        && let Some(slot) = element.find_class(slot)
    {
        for child in slot.elements() {
            let instance = hydrate_element(source, child, location, None, registry)?;
            if !component.allowed_children().contains(&instance.name()) {
                return Err(fail(MalformedReason::ChildNotAllowed {
                    parent: name.to_string(),
                    child: instance.name().to_string(),
                }));
            }
            children.push(instance);
        }
    }

    Ok(EditableInstance::from_parts(component, attributes, children))
}

fn component_name(class: &str) -> Option<&str> {
    class.strip_prefix(CLASS_PREFIX).filter(|n| !n.is_empty())
}

fn json_attr(element: &Element, attribute: &'static str) -> Result<Map<String, Value>, MalformedReason> {
    let Some(text) = element.attr(attribute) else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(MalformedReason::InvalidJson {
            attribute,
            message: format!("found {other}"),
        }),
        Err(e) => Err(MalformedReason::InvalidJson {
            attribute,
            message: e.to_string(),
        }),
    }
}
