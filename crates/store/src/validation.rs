use std::path::{Component, Path};

use crate::StoreError;

/// Validates an object name before it is mapped onto a storage location.
///
/// Rejects:
/// - Empty names
/// - Absolute names (`/x`, `C:\x`)
/// - Parent directory traversal (`..`)
/// - Empty or `.` segments (`a//b`, `a/./b`)
pub fn validate_object_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidName("empty object name".into()));
    }
    if name.starts_with('/') {
        return Err(StoreError::InvalidName(format!(
            "absolute object name not allowed: {name}"
        )));
    }
    if name.split('/').any(|seg| seg.is_empty() || seg == ".") {
        return Err(StoreError::InvalidName(format!(
            "empty or '.' segment not allowed: {name}"
        )));
    }

    for component in Path::new(name).components() {
        match component {
            Component::ParentDir => {
                return Err(StoreError::InvalidName(format!(
                    "parent directory traversal not allowed: {name}"
                )));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(StoreError::InvalidName(format!(
                    "absolute object name not allowed: {name}"
                )));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

/// Validates a container name: a single non-empty path segment.
pub fn validate_container_name(container: &str) -> Result<(), StoreError> {
    if container.is_empty() || container == "." || container == ".." {
        return Err(StoreError::InvalidName(format!(
            "invalid container name: {container:?}"
        )));
    }
    if container.contains(['/', '\\']) {
        return Err(StoreError::InvalidName(format!(
            "container name must not contain separators: {container}"
        )));
    }
    Ok(())
}
