use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

use crate::component::Registry;
use crate::editing::EditableInstance;
use crate::fragment::{MalformedFragmentError, parse_document, serialize_document};

/// Extension of stored documents.
pub const DOCUMENT_EXTENSION: &str = "html";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid content directory: {0}")]
    InvalidContentDir(String),
}

/// Read a stored document and return its text
pub fn read_document(relative_path: &RelativePath, content_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(content_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    Ok(fs::read_to_string(&absolute_path)?)
}

/// Write a stored document, creating parent directories as needed
pub fn write_document(
    relative_path: &RelativePath,
    content_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(content_root);
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&absolute_path, content)?;
    log::debug!("wrote {}", absolute_path.display());
    Ok(())
}

/// Read a document and hydrate each of its fragments.
pub fn load_instances(
    relative_path: &RelativePath,
    content_root: &Path,
    registry: &Registry,
) -> Result<Vec<Result<EditableInstance, MalformedFragmentError>>, IoError> {
    let text = read_document(relative_path, content_root)?;
    Ok(parse_document(&text, registry))
}

/// Serialize `instances` as one document.
pub fn save_instances(
    relative_path: &RelativePath,
    content_root: &Path,
    instances: &[EditableInstance],
) -> Result<(), IoError> {
    write_document(relative_path, content_root, &serialize_document(instances))
}

/// Scan for stored documents under the content root
pub fn scan_documents(content_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_content_dir(content_root)?;
    let mut files = Vec::new();
    scan_directory_recursive(content_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == DOCUMENT_EXTENSION
        {
            files.push(path);
        }
    }
    Ok(())
}

pub fn validate_content_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidContentDir(format!(
            "content directory not found: {}",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create, create_test_content_dir, create_test_file, registry};
    use serde_json::json;

    #[test]
    fn scans_nested_documents_only() {
        let root = create_test_content_dir();
        create_test_file(&root, "b.html", "");
        create_test_file(&root, "notes.md", "# not a document");
        create_test_file(&root, "nested/a.html", "");

        let files = scan_documents(root.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(root.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("b.html"), PathBuf::from("nested/a.html")]);
    }

    #[test]
    fn missing_content_dir_is_rejected() {
        let result = scan_documents(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(IoError::InvalidContentDir(_))));
    }

    #[test]
    fn read_missing_document() {
        let root = create_test_content_dir();
        let result = read_document(RelativePath::new("nope.html"), root.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn write_creates_parents_and_overwrites() {
        let root = create_test_content_dir();
        let path = RelativePath::new("pages/home/index.html");

        write_document(path, root.path(), "first").unwrap();
        write_document(path, root.path(), "second").unwrap();

        assert_eq!(read_document(path, root.path()).unwrap(), "second");
        assert!(root.path().join("pages").join("home").is_dir());
    }

    #[test]
    fn instances_survive_save_and_load() {
        let root = create_test_content_dir();
        let path = RelativePath::new("page.html");
        let instances = vec![
            create("basic-text", json!({"content": "Hi", "dropCap": true})),
            create("interactive-counter", json!({"initialValue": 3})),
        ];

        save_instances(path, root.path(), &instances).unwrap();
        let loaded: Vec<_> = load_instances(path, root.path(), &registry())
            .unwrap()
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(loaded.len(), 2);
        for (saved, loaded) in instances.iter().zip(&loaded) {
            assert_eq!(saved.attributes(), loaded.attributes());
        }
    }
}
