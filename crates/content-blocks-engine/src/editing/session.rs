use serde_json::{Map, Value};

use super::instance::{Change, ChangeKind, EditError, EditableInstance, InstanceId};
use crate::component::Registry;
use crate::fragment::{MalformedFragmentError, parse_document, serialize_document};

/// Edit commands understood by [`EditingSession::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Create a component and insert it under `parent`, or at the top level.
    Insert {
        parent: Option<InstanceId>,
        position: usize,
        component: String,
        attributes: Map<String, Value>,
    },
    Remove {
        id: InstanceId,
    },
    Update {
        id: InstanceId,
        attributes: Map<String, Value>,
    },
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub change: Change,
    pub version: u64,
}

type Listener = Box<dyn FnMut(&Patch)>;

/// Owns the top-level instances of one editing session.
pub struct EditingSession {
    registry: Registry,
    roots: Vec<EditableInstance>,
    version: u64,
    listeners: Vec<Listener>,
}

impl EditingSession {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            roots: Vec::new(),
            version: 0,
            listeners: Vec::new(),
        }
    }

    /// Hydrate a stored document. Any malformed fragment fails the load, so
    /// a later save can never drop content that did not parse.
    pub fn load(registry: Registry, text: &str) -> Result<Self, Vec<MalformedFragmentError>> {
        let mut roots = Vec::new();
        let mut errors = Vec::new();
        for result in parse_document(text, &registry) {
            match result {
                Ok(instance) => roots.push(instance),
                Err(e) => errors.push(e),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            roots,
            ..Self::new(registry)
        })
    }

    /// Serialize every top-level instance.
    pub fn save(&self) -> String {
        serialize_document(&self.roots)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn roots(&self) -> &[EditableInstance] {
        &self.roots
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: InstanceId) -> Option<&EditableInstance> {
        self.roots.iter().find_map(|r| r.find(id))
    }

    /// Register a listener called once per successful command.
    pub fn subscribe(&mut self, listener: impl FnMut(&Patch) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Apply an edit command.
    ///
    /// On success the version increases by one and every listener sees the
    /// returned [`Patch`]. On error nothing changes and no one is notified.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditError> {
        let change = match cmd {
            Cmd::Insert {
                parent,
                position,
                component,
                attributes,
            } => {
                let component = self
                    .registry
                    .get(&component)
                    .ok_or(EditError::UnknownComponent(component))?;
                let child = EditableInstance::create_with(component, &attributes)?;
                match parent {
                    Some(parent) => self
                        .find_mut(parent)
                        .ok_or(EditError::NotFound(parent))?
                        .insert_child(position, child)?,
                    None => {
                        let position = position.min(self.roots.len());
                        let id = child.id();
                        self.roots.insert(position, child);
                        Change {
                            instance: id,
                            kind: ChangeKind::Created { position },
                        }
                    }
                }
            }
            Cmd::Remove { id } => match self.roots.iter().position(|r| r.id() == id) {
                Some(position) => {
                    self.roots.remove(position);
                    Change {
                        instance: id,
                        kind: ChangeKind::Removed { position },
                    }
                }
                None => self
                    .roots
                    .iter_mut()
                    .find_map(|r| r.find_parent_mut(id))
                    .ok_or(EditError::NotFound(id))?
                    .remove_child(id)?,
            },
            Cmd::Update { id, attributes } => self
                .find_mut(id)
                .ok_or(EditError::NotFound(id))?
                .update(&attributes)?,
        };

        self.version += 1;
        let patch = Patch {
            change,
            version: self.version,
        };
        for listener in &mut self.listeners {
            listener(&patch);
        }
        Ok(patch)
    }

    fn find_mut(&mut self, id: InstanceId) -> Option<&mut EditableInstance> {
        self.roots.iter_mut().find_map(|r| r.find_mut(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::obj;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> EditingSession {
        EditingSession::new(Registry::with_blocks().unwrap())
    }

    fn insert(session: &mut EditingSession, parent: Option<InstanceId>, component: &str) -> InstanceId {
        let patch = session
            .apply(Cmd::Insert {
                parent,
                position: usize::MAX,
                component: component.to_string(),
                attributes: Map::new(),
            })
            .unwrap();
        match patch.change.kind {
            ChangeKind::ChildInserted { child, .. } => child,
            _ => patch.change.instance,
        }
    }

    #[test]
    fn versions_increase_per_command() {
        let mut session = session();
        let card = insert(&mut session, None, "advanced-card");
        insert(&mut session, Some(card), "basic-text");

        let patch = session
            .apply(Cmd::Update {
                id: card,
                attributes: obj(json!({"shadow": "large"})),
            })
            .unwrap();

        assert_eq!(patch.version, 3);
        assert_eq!(session.version(), 3);
        assert_eq!(session.get(card).unwrap().attributes().string("shadow"), "large");
    }

    #[test]
    fn failed_commands_change_nothing() {
        let mut session = session();
        let text = insert(&mut session, None, "basic-text");

        let err = session.apply(Cmd::Insert {
            parent: Some(text),
            position: 0,
            component: "basic-text".into(),
            attributes: Map::new(),
        });

        assert!(matches!(err, Err(EditError::ChildrenNotAllowed(_))));
        assert_eq!(session.version(), 1);
        assert!(session.get(text).unwrap().children().is_empty());
    }

    #[test]
    fn listeners_see_each_patch_once() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(move |patch| sink.borrow_mut().push(patch.version));

        let id = insert(&mut session, None, "interactive-counter");
        session.apply(Cmd::Remove { id }).unwrap();
        let _ = session.apply(Cmd::Remove { id });

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn removes_nested_children() {
        let mut session = session();
        let card = insert(&mut session, None, "advanced-card");
        let text = insert(&mut session, Some(card), "basic-text");

        let patch = session.apply(Cmd::Remove { id: text }).unwrap();
        assert_eq!(
            patch.change,
            Change {
                instance: card,
                kind: ChangeKind::ChildRemoved {
                    child: text,
                    position: 0
                }
            }
        );
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut session = session();
        let card = insert(&mut session, None, "advanced-card");
        insert(&mut session, Some(card), "interactive-counter");
        insert(&mut session, None, "basic-text");

        let saved = session.save();
        let reloaded = EditingSession::load(Registry::with_blocks().unwrap(), &saved).unwrap();

        assert_eq!(reloaded.roots().len(), 2);
        assert_eq!(reloaded.roots()[0].children().len(), 1);
        assert_eq!(reloaded.save(), saved);
    }

    #[test]
    fn load_refuses_malformed_documents() {
        let errors = EditingSession::load(
            Registry::with_blocks().unwrap(),
            "<div class=\"cb-basic-text\"><p class=\"basic-text-content\">ok</p></div>\n\n<div class=\"cb-nope\"></div>",
        )
        .err()
        .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location.ordinal, 1);
    }
}
