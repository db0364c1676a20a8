use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};
use tempfile::TempDir;

use crate::blocks::{AdvancedCard, BasicText, InteractiveCounter};
use crate::component::{Component, Registry};
use crate::editing::EditableInstance;

/// Registry holding the bundled blocks
pub fn registry() -> Registry {
    Registry::with_blocks().unwrap()
}

pub fn basic_text() -> Arc<dyn Component> {
    Arc::new(BasicText::new().unwrap())
}

pub fn card() -> Arc<dyn Component> {
    Arc::new(AdvancedCard::new().unwrap())
}

pub fn counter() -> Arc<dyn Component> {
    Arc::new(InteractiveCounter::new().unwrap())
}

/// Unwrap a `json!({...})` literal into its object map
pub fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Instance of a bundled block with the given raw attributes
pub fn create(component: &str, attributes: Value) -> EditableInstance {
    let component = registry().get(component).unwrap();
    EditableInstance::create_with(component, &obj(attributes)).unwrap()
}

/// Create a temporary content directory
pub fn create_test_content_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test document, with any parent directories
pub fn create_test_file(content_dir: &TempDir, relative: &str, content: &str) -> PathBuf {
    let file_path = content_dir.path().join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}
