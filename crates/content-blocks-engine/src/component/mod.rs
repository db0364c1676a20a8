//! # Components and Registration
//!
//! A [`Component`] bundles everything the model needs to know about one kind
//! of block: its schema, its single view function, its edit renderer and its
//! child rules. Hosts learn about components through the narrow [`Host`]
//! trait; [`Registry`] is the in-memory host used by the codec, the renderer
//! and the CLI. There is no global table: callers pass a registry around.

pub mod inspector;
pub mod media;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::markup::Element;
use crate::schema::{AttributeSchema, AttributeSet, SchemaError, ValidationError};

pub use inspector::{Control, Inspector, Panel, Widget};
pub use media::{MediaPicker, MediaSelection, MediaType};

/// One kind of content block.
pub trait Component: Send + Sync {
    /// Registered name. Also the `cb-<name>` wrapper class.
    fn name(&self) -> &'static str;

    /// Human readable title.
    fn title(&self) -> &'static str;

    fn schema(&self) -> &AttributeSchema;

    /// Build the visual markup for a validated attribute set.
    ///
    /// `inner` is the serialized markup of the children, placed in the
    /// children slot when the component has one. The same function feeds the
    /// serializer and the non-interactive renderer.
    fn view(&self, attributes: &AttributeSet, inner: Option<&str>) -> Element;

    /// Rules spanning several attributes, checked after schema validation.
    fn check(&self, _attributes: &AttributeSet) -> Result<(), Vec<ValidationError>> {
        Ok(())
    }

    /// Edit renderer: the controls an editor shows for this block.
    fn inspector(&self, attributes: &AttributeSet) -> Inspector;

    /// Class of the element that holds child fragments.
    fn children_slot(&self) -> Option<&'static str> {
        None
    }

    /// Component names allowed in the children slot.
    fn allowed_children(&self) -> &[&'static str] {
        &[]
    }

    /// Store namespace for the client runtime, written as
    /// `data-cb-interactive`.
    fn interactive(&self) -> Option<&'static str> {
        None
    }
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component").field("name", &self.name()).finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("component `{0}` is already registered")]
    Duplicate(String),
    #[error("component registered as `{registered}` calls itself `{actual}`")]
    NameMismatch { registered: String, actual: String },
    #[error("component name `{0}` must be lowercase letters, digits and dashes")]
    InvalidName(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Registration interface consumed from the host.
pub trait Host {
    fn register_component(
        &mut self,
        name: &str,
        component: Arc<dyn Component>,
    ) -> Result<(), RegistryError>;
}

/// In-memory component registry.
#[derive(Clone, Default)]
pub struct Registry {
    components: BTreeMap<String, Arc<dyn Component>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the bundled blocks.
    pub fn with_blocks() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        crate::blocks::register_all(&mut registry)?;
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.components.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn components(&self) -> impl Iterator<Item = &Arc<dyn Component>> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Host for Registry {
    fn register_component(
        &mut self,
        name: &str,
        component: Arc<dyn Component>,
    ) -> Result<(), RegistryError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if component.name() != name {
            return Err(RegistryError::NameMismatch {
                registered: name.to_string(),
                actual: component.name().to_string(),
            });
        }
        if self.components.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        log::info!("registered component `{name}`");
        self.components.insert(name.to_string(), component);
        Ok(())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.components.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::BasicText;

    #[test]
    fn registers_bundled_blocks() {
        let registry = Registry::with_blocks().unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["advanced-card", "basic-text", "interactive-counter"]);
    }

    #[test]
    fn rejects_duplicates_and_mismatches() {
        let mut registry = Registry::new();
        let text: Arc<dyn Component> = Arc::new(BasicText::new().unwrap());

        registry.register_component("basic-text", text.clone()).unwrap();
        assert!(matches!(
            registry.register_component("basic-text", text.clone()),
            Err(RegistryError::Duplicate(_))
        ));
        assert!(matches!(
            registry.register_component("other", text.clone()),
            Err(RegistryError::NameMismatch { .. })
        ));
        assert!(matches!(
            registry.register_component("Bad Name", text),
            Err(RegistryError::InvalidName(_))
        ));
    }
}
