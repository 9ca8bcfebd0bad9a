//! Object store interface consumed by the inventory and the upload driver.
//!
//! A store is a set of named containers, each holding objects addressed by
//! `/`-separated names. Listing is paged in lexical order, the way Swift
//! and S3 list containers.

mod dir;
mod memory;
mod validation;

pub use dir::DirStore;
pub use memory::MemoryStore;
pub use validation::{validate_container_name, validate_object_name};

/// Number of names requested per listing page.
pub const LIST_PAGE_SIZE: usize = 1000;

/// Errors produced by object stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("object not found: {container}/{name}")]
    ObjectNotFound { container: String, name: String },

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Lists object names in a container.
pub trait ObjectLister {
    /// Returns up to `limit` names sorted lexically, all strictly greater
    /// than `marker` when one is given.
    fn list_page(
        &self,
        container: &str,
        marker: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>, StoreError>;

    /// Returns every object name in the container, following pages.
    fn object_names(&self, container: &str) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let page = self.list_page(container, marker.as_deref(), LIST_PAGE_SIZE)?;
            let last_page = page.len() < LIST_PAGE_SIZE;
            marker = page.last().cloned();
            names.extend(page);
            if last_page || marker.is_none() {
                break;
            }
        }
        tracing::trace!(container, count = names.len(), "listed container");
        Ok(names)
    }
}

/// Full object store: listing plus object reads and writes.
pub trait ObjectStore: ObjectLister {
    /// Creates `container` if it does not exist yet.
    fn create_container(&self, container: &str) -> Result<(), StoreError>;

    /// Stores `data` as `name`, replacing any existing object.
    ///
    /// Returns the etag (SHA-256 hex) of the stored bytes. The object
    /// becomes visible in listings only once fully written.
    fn put_object(&self, container: &str, name: &str, data: &[u8]) -> Result<String, StoreError>;

    /// Reads the whole object.
    fn get_object(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError>;
}

/// Selects the page of `sorted` names following `marker`.
fn page_after<'a, I>(sorted: I, marker: Option<&str>, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    sorted
        .into_iter()
        .filter(|name| marker.is_none_or(|m| name.as_str() > m))
        .take(limit)
        .cloned()
        .collect()
}
