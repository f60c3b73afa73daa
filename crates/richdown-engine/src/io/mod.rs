//! Persistence adapter: loads and saves the raw buffer string under a
//! fixed document key inside a storage root. No structural state crosses
//! this boundary.

use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

/// The fixed key the buffer is persisted under.
pub const DOCUMENT_KEY: &str = "document.md";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("Document not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid storage directory: {0}")]
    InvalidStorageDir(String),
}

/// Absolute path of the document inside the storage root.
pub fn document_path(storage_root: &Path) -> PathBuf {
    RelativePath::new(DOCUMENT_KEY).to_path(storage_root)
}

/// Reads the raw buffer string.
pub fn load_document(storage_root: &Path) -> Result<String, IoError> {
    let path = document_path(storage_root);
    if !path.exists() {
        return Err(IoError::NotFound(path));
    }
    fs::read_to_string(&path).map_err(IoError::Io)
}

/// Writes the raw buffer string, creating the storage root if needed.
pub fn save_document(storage_root: &Path, buffer: &str) -> Result<(), IoError> {
    let path = document_path(storage_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }
    fs::write(&path, buffer).map_err(IoError::Io)
}

/// Checks that the storage root exists and is a directory.
pub fn validate_storage_dir(storage_root: &Path) -> Result<(), IoError> {
    if !storage_root.exists() {
        return Err(IoError::InvalidStorageDir(
            "storage directory not found".to_string(),
        ));
    }
    if !storage_root.is_dir() {
        return Err(IoError::InvalidStorageDir(
            "storage path is not a directory".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_round_trips_the_buffer() {
        let dir = TempDir::new().unwrap();
        let buffer = "# Saved\n\nWith *markers* intact.";
        save_document(dir.path(), buffer).unwrap();
        assert_eq!(load_document(dir.path()).unwrap(), buffer);
    }

    #[test]
    fn loading_a_missing_document_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_document(dir.path()).unwrap_err();
        assert!(matches!(err, IoError::NotFound(_)));
    }

    #[test]
    fn save_creates_the_storage_root() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("storage");
        save_document(&nested, "content").unwrap();
        assert_eq!(load_document(&nested).unwrap(), "content");
    }

    #[test]
    fn validate_rejects_missing_and_non_directories() {
        let dir = TempDir::new().unwrap();
        assert!(validate_storage_dir(dir.path()).is_ok());
        assert!(validate_storage_dir(&dir.path().join("missing")).is_err());
        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(validate_storage_dir(&file).is_err());
    }
}
