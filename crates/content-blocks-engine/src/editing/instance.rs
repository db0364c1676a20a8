use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::component::Component;
use crate::schema::{AttributeSet, ValidationError};

/// Opaque identity of an editable instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a successful mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// These attributes were replaced, in input order.
    Attributes(Vec<String>),
    ChildInserted { child: InstanceId, position: usize },
    ChildRemoved { child: InstanceId, position: usize },
    /// A top-level instance was added to a session.
    Created { position: usize },
    /// A top-level instance was removed from a session.
    Removed { position: usize },
}

/// The change notification every successful mutation returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub instance: InstanceId,
    pub kind: ChangeKind,
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("`{component}` has no attribute `{field}`")]
    UnknownAttribute { component: String, field: String },
    #[error("invalid attributes: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
    #[error("`{0}` does not accept children")]
    ChildrenNotAllowed(String),
    #[error("`{parent}` does not accept `{child}` children")]
    ChildNotAllowed { parent: String, child: String },
    #[error("no instance with id {0}")]
    NotFound(InstanceId),
    #[error("unknown component `{0}`")]
    UnknownComponent(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// An in-memory instance of a component being edited.
///
/// Attributes and children change only through [`update`](Self::update),
/// [`insert_child`](Self::insert_child) and
/// [`remove_child`](Self::remove_child). Each returns a [`Change`] that the
/// owner forwards to whatever re-renders. Instances never render themselves.
#[derive(Clone)]
pub struct EditableInstance {
    id: InstanceId,
    component: Arc<dyn Component>,
    attributes: AttributeSet,
    children: Vec<EditableInstance>,
}

impl EditableInstance {
    /// A new instance holding the schema defaults and no children.
    pub fn create(component: Arc<dyn Component>) -> Result<Self, EditError> {
        let attributes = component.schema().defaults().map_err(EditError::Invalid)?;
        Ok(Self::from_parts(component, attributes, Vec::new()))
    }

    /// A new instance from raw input, validated strictly.
    pub fn create_with(
        component: Arc<dyn Component>,
        raw: &Map<String, Value>,
    ) -> Result<Self, EditError> {
        let attributes = component.schema().validate(raw).map_err(EditError::Invalid)?;
        component.check(&attributes).map_err(EditError::Invalid)?;
        Ok(Self::from_parts(component, attributes, Vec::new()))
    }

    pub(crate) fn from_parts(
        component: Arc<dyn Component>,
        attributes: AttributeSet,
        children: Vec<EditableInstance>,
    ) -> Self {
        Self {
            id: InstanceId::new(),
            component,
            attributes,
            children,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    pub fn name(&self) -> &'static str {
        self.component.name()
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn children(&self) -> &[EditableInstance] {
        &self.children
    }

    /// Replace the given attributes.
    ///
    /// Unknown keys are rejected and every given value is re-validated. On
    /// any error nothing changes.
    pub fn update(&mut self, raw: &Map<String, Value>) -> Result<Change, EditError> {
        let schema = self.component.schema();
        if let Some(field) = raw.keys().find(|k| schema.field(k).is_none()) {
            return Err(EditError::UnknownAttribute {
                component: self.name().to_string(),
                field: field.clone(),
            });
        }

        let updates = schema.validate_partial(raw).map_err(EditError::Invalid)?;
        let names = updates.iter().map(|(name, _)| name.clone()).collect();
        let mut next = self.attributes.clone();
        for (name, value) in updates {
            next.set(name, value);
        }
        self.component.check(&next).map_err(EditError::Invalid)?;
        self.attributes = next;

        Ok(Change {
            instance: self.id,
            kind: ChangeKind::Attributes(names),
        })
    }

    /// Insert a child at `position`, clamped to `[0, len]`.
    pub fn insert_child(
        &mut self,
        position: usize,
        child: EditableInstance,
    ) -> Result<Change, EditError> {
        if self.component.children_slot().is_none() {
            return Err(EditError::ChildrenNotAllowed(self.name().to_string()));
        }
        if !self.component.allowed_children().contains(&child.name()) {
            return Err(EditError::ChildNotAllowed {
                parent: self.name().to_string(),
                child: child.name().to_string(),
            });
        }

        let position = position.min(self.children.len());
        let child_id = child.id;
        self.children.insert(position, child);

        Ok(Change {
            instance: self.id,
            kind: ChangeKind::ChildInserted {
                child: child_id,
                position,
            },
        })
    }

    /// Remove the direct child with `id`.
    pub fn remove_child(&mut self, id: InstanceId) -> Result<Change, EditError> {
        let position = self
            .children
            .iter()
            .position(|c| c.id == id)
            .ok_or(EditError::NotFound(id))?;
        self.children.remove(position);

        Ok(Change {
            instance: self.id,
            kind: ChangeKind::ChildRemoved {
                child: id,
                position,
            },
        })
    }

    /// This instance or a descendant.
    pub fn find(&self, id: InstanceId) -> Option<&EditableInstance> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: InstanceId) -> Option<&mut EditableInstance> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// The instance whose direct child has `id`.
    pub fn find_parent_mut(&mut self, id: InstanceId) -> Option<&mut EditableInstance> {
        if self.children.iter().any(|c| c.id == id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_parent_mut(id))
    }
}

impl fmt::Debug for EditableInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditableInstance")
            .field("id", &self.id)
            .field("component", &self.name())
            .field("attributes", &self.attributes)
            .field("children", &self.children)
            .finish()
    }
}
