use std::io::Write;
use std::path::{Path, PathBuf};

use slosync_transfer::checksum_bytes;
use tracing::debug;

use crate::validation::{validate_container_name, validate_object_name};
use crate::{ObjectLister, ObjectStore, StoreError, page_after};

/// Object store backed by a local directory tree.
///
/// Each container is a directory directly under `root`; each object is a
/// file whose path relative to the container is the object name.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &str) -> Result<PathBuf, StoreError> {
        validate_container_name(container)?;
        let dir = self.root.join(container);
        if !dir.is_dir() {
            return Err(StoreError::ContainerNotFound(container.to_string()));
        }
        Ok(dir)
    }

    fn object_path(&self, container: &str, name: &str) -> Result<PathBuf, StoreError> {
        validate_object_name(name)?;
        let dir = self.container_dir(container)?;
        Ok(name.split('/').fold(dir, |path, seg| path.join(seg)))
    }
}

/// Collects `/`-joined names of every regular file under `dir`.
fn walk(dir: &Path, prefix: &str, out: &mut Vec<String>) -> Result<(), StoreError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            debug!(path = %entry.path().display(), "skipping non UTF-8 name");
            continue;
        };
        let name = if prefix.is_empty() {
            file_name
        } else {
            format!("{prefix}/{file_name}")
        };
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&entry.path(), &name, out)?;
        } else if file_type.is_file() {
            out.push(name);
        }
    }
    Ok(())
}

impl ObjectLister for DirStore {
    fn list_page(
        &self,
        container: &str,
        marker: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let dir = self.container_dir(container)?;
        let mut names = Vec::new();
        walk(&dir, "", &mut names)?;
        names.sort();
        Ok(page_after(&names, marker, limit))
    }
}

impl ObjectStore for DirStore {
    fn create_container(&self, container: &str) -> Result<(), StoreError> {
        validate_container_name(container)?;
        std::fs::create_dir_all(self.root.join(container))?;
        Ok(())
    }

    fn put_object(&self, container: &str, name: &str, data: &[u8]) -> Result<String, StoreError> {
        let path = self.object_path(container, name)?;
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::InvalidName(name.to_string()))?;
        std::fs::create_dir_all(parent)?;

        // Write to a sibling temp file and rename, so a partial write never
        // shows up under the final name.
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(container, name, bytes = data.len(), "stored object");
        Ok(checksum_bytes(data))
    }

    fn get_object(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(container, name)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::ObjectNotFound {
                container: container.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, DirStore) {
        let dir = TempDir::new().unwrap();
        let store = DirStore::open(dir.path().join("store")).unwrap();
        store.create_container("c").unwrap();
        (dir, store)
    }

    #[test]
    fn put_get_nested_names() {
        let (_dir, store) = open_store();
        store.put_object("c", "disk.img/chunk-00000000", b"abc").unwrap();
        assert_eq!(
            store.get_object("c", "disk.img/chunk-00000000").unwrap(),
            b"abc"
        );
        assert!(
            store
                .root()
                .join("c")
                .join("disk.img")
                .join("chunk-00000000")
                .is_file()
        );
    }

    #[test]
    fn put_overwrites() {
        let (_dir, store) = open_store();
        store.put_object("c", "x", b"old").unwrap();
        let etag = store.put_object("c", "x", b"new").unwrap();
        assert_eq!(etag, checksum_bytes(b"new"));
        assert_eq!(store.get_object("c", "x").unwrap(), b"new");
    }

    #[test]
    fn listing_walks_tree_sorted() {
        let (_dir, store) = open_store();
        store.put_object("c", "z", b"").unwrap();
        store.put_object("c", "a/2", b"").unwrap();
        store.put_object("c", "a/1", b"").unwrap();

        assert_eq!(store.object_names("c").unwrap(), vec!["a/1", "a/2", "z"]);
        assert_eq!(store.list_page("c", Some("a/1"), 1).unwrap(), vec!["a/2"]);
    }

    #[test]
    fn listing_leaves_no_temp_files() {
        let (_dir, store) = open_store();
        store.put_object("c", "obj", b"payload").unwrap();
        assert_eq!(store.object_names("c").unwrap(), vec!["obj"]);
    }

    #[test]
    fn missing_container_and_object() {
        let (_dir, store) = open_store();
        assert!(matches!(
            store.object_names("absent"),
            Err(StoreError::ContainerNotFound(_))
        ));
        assert!(matches!(
            store.get_object("c", "absent"),
            Err(StoreError::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn traversal_rejected() {
        let (_dir, store) = open_store();
        assert!(matches!(
            store.put_object("c", "../escape", b""),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.object_names(".."),
            Err(StoreError::InvalidName(_))
        ));
    }
}
