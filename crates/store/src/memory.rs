use std::collections::BTreeMap;
use std::sync::RwLock;

use slosync_transfer::checksum_bytes;

use crate::validation::{validate_container_name, validate_object_name};
use crate::{ObjectLister, ObjectStore, StoreError, page_after};

type Container = BTreeMap<String, Vec<u8>>;

/// In-memory object store (thread-safe).
#[derive(Default)]
pub struct MemoryStore {
    containers: RwLock<BTreeMap<String, Container>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes an object. Missing objects are not an error.
    pub fn delete_object(&self, container: &str, name: &str) -> Result<(), StoreError> {
        let mut containers = self.containers.write().unwrap();
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        objects.remove(name);
        Ok(())
    }

    /// Number of objects in `container` (0 if it does not exist).
    pub fn object_count(&self, container: &str) -> usize {
        let containers = self.containers.read().unwrap();
        containers.get(container).map_or(0, BTreeMap::len)
    }
}

impl ObjectLister for MemoryStore {
    fn list_page(
        &self,
        container: &str,
        marker: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let containers = self.containers.read().unwrap();
        let objects = containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        Ok(page_after(objects.keys(), marker, limit))
    }
}

impl ObjectStore for MemoryStore {
    fn create_container(&self, container: &str) -> Result<(), StoreError> {
        validate_container_name(container)?;
        let mut containers = self.containers.write().unwrap();
        containers.entry(container.to_string()).or_default();
        Ok(())
    }

    fn put_object(&self, container: &str, name: &str, data: &[u8]) -> Result<String, StoreError> {
        validate_object_name(name)?;
        let mut containers = self.containers.write().unwrap();
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;
        objects.insert(name.to_string(), data.to_vec());
        Ok(checksum_bytes(data))
    }

    fn get_object(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        validate_object_name(name)?;
        let containers = self.containers.read().unwrap();
        containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ObjectNotFound {
                container: container.to_string(),
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_roundtrip() {
        let store = MemoryStore::new();
        store.create_container("c").unwrap();
        let etag = store.put_object("c", "a/b", b"data").unwrap();
        assert_eq!(etag, checksum_bytes(b"data"));
        assert_eq!(store.get_object("c", "a/b").unwrap(), b"data");
    }

    #[test]
    fn missing_container_is_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.object_names("nope"),
            Err(StoreError::ContainerNotFound(_))
        ));
        assert!(matches!(
            store.put_object("nope", "x", b""),
            Err(StoreError::ContainerNotFound(_))
        ));
    }

    #[test]
    fn missing_object_is_error() {
        let store = MemoryStore::new();
        store.create_container("c").unwrap();
        assert!(matches!(
            store.get_object("c", "x"),
            Err(StoreError::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn listing_is_sorted_and_paged() {
        let store = MemoryStore::new();
        store.create_container("c").unwrap();
        for name in ["b", "a", "d", "c"] {
            store.put_object("c", name, b"").unwrap();
        }
        assert_eq!(store.list_page("c", None, 2).unwrap(), vec!["a", "b"]);
        assert_eq!(store.list_page("c", Some("b"), 2).unwrap(), vec!["c", "d"]);
        assert_eq!(store.object_names("c").unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn create_container_is_idempotent() {
        let store = MemoryStore::new();
        store.create_container("c").unwrap();
        store.put_object("c", "x", b"1").unwrap();
        store.create_container("c").unwrap();
        assert_eq!(store.object_count("c"), 1);
    }

    #[test]
    fn delete_object_removes_from_listing() {
        let store = MemoryStore::new();
        store.create_container("c").unwrap();
        store.put_object("c", "x", b"1").unwrap();
        store.delete_object("c", "x").unwrap();
        store.delete_object("c", "x").unwrap();
        assert!(store.object_names("c").unwrap().is_empty());
    }

    #[test]
    fn invalid_names_rejected() {
        let store = MemoryStore::new();
        store.create_container("c").unwrap();
        assert!(matches!(
            store.put_object("c", "../x", b""),
            Err(StoreError::InvalidName(_))
        ));
        assert!(store.create_container("a/b").is_err());
    }
}
