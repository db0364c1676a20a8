//! # content-blocks-engine
//!
//! A structured content component model: typed attribute schemas, editable
//! instances, a lossless fragment codec, a non-interactive renderer and a
//! reactive view store for interactive blocks.
//!
//! ```rust
//! use content_blocks_engine::{Registry, deserialize, render, serialize};
//! use content_blocks_engine::editing::EditableInstance;
//! use serde_json::json;
//!
//! let registry = Registry::with_blocks().unwrap();
//! let text = registry.get("basic-text").unwrap();
//! let raw = json!({ "content": "Hello", "textAlign": "center" });
//! let instance = EditableInstance::create_with(text, raw.as_object().unwrap()).unwrap();
//!
//! let fragment = serialize(&instance);
//! let loaded = deserialize(fragment.as_str(), &registry).unwrap();
//! assert_eq!(loaded.attributes(), instance.attributes());
//! assert_eq!(
//!     render(loaded.component().as_ref(), loaded.attributes()),
//!     fragment.as_str()
//! );
//! ```

pub mod blocks;
pub mod component;
pub mod editing;
pub mod fragment;
pub mod interactivity;
pub mod io;
pub mod markup;
pub mod render;
pub mod schema;

#[cfg(test)]
pub mod tests;

pub use component::{Component, Host, Registry, RegistryError};
pub use editing::{Change, EditError, EditableInstance, EditingSession};
pub use fragment::{
    Hydrated, MalformedFragmentError, PersistedFragment, deserialize, deserialize_as,
    deserialize_or_default, parse_document, serialize, serialize_document,
};
pub use io::*;
pub use render::{FallbackPolicy, RenderedDocument, render, render_document, render_with_inner};
pub use schema::{AttributeSchema, AttributeSet, SchemaError, ValidationError};
