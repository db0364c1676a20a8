/*!
 * # Editing Core
 *
 * Editable state lives in [`EditableInstance`] trees owned by an
 * [`EditingSession`].
 *
 * ## Mutation Model
 *
 * - Instances are never assigned to directly. Attributes change through
 *   `update`, children through `insert_child` / `remove_child`.
 * - Every successful mutation returns a [`Change`]. Failed mutations leave
 *   the instance untouched.
 * - A session wraps the same operations as commands ([`Cmd`]) and returns a
 *   versioned [`Patch`], notifying subscribers once per command.
 *
 * ## Usage Pattern
 *
 * ```rust
 * use content_blocks_engine::component::Registry;
 * use content_blocks_engine::editing::*;
 * use serde_json::Map;
 *
 * let mut session = EditingSession::new(Registry::with_blocks().unwrap());
 *
 * // 1. Insert a block at the top level
 * let patch = session
 *     .apply(Cmd::Insert {
 *         parent: None,
 *         position: 0,
 *         component: "interactive-counter".into(),
 *         attributes: Map::new(),
 *     })
 *     .unwrap();
 *
 * // 2. Update attributes through commands
 * let mut attrs = Map::new();
 * attrs.insert("step".into(), 5.into());
 * session
 *     .apply(Cmd::Update { id: patch.change.instance, attributes: attrs })
 *     .unwrap();
 *
 * // 3. Persist
 * let stored = session.save();
 * assert!(stored.contains("\"step\":5"));
 * ```
 */

pub mod instance;
pub mod session;

pub use instance::{Change, ChangeKind, EditError, EditableInstance, InstanceId};
pub use session::{Cmd, EditingSession, Patch};
