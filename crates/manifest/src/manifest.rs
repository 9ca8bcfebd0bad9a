use serde::{Deserialize, Serialize};

use crate::{CHUNK_INDEX_WIDTH, ChunkLayout, ManifestError};

/// Layout of one chunked upload.
///
/// Only constructed through [`Manifest::new`], which rejects a zero chunk size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Container holding chunks and the manifest object.
    pub container: String,
    /// Name of the manifest object; chunk names are derived from it.
    pub object_name: String,
    /// Size of every chunk except possibly the last.
    pub chunk_size: u64,
    /// Total size of the logical object in bytes.
    pub content_length: u64,
    /// Etag per chunk, filled in as chunks are stored.
    etags: Vec<Option<String>>,
}

/// One entry of the manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// `<container>/<chunk name>`.
    pub path: String,
    pub size_bytes: u64,
    /// Etag returned when this run stored the chunk. `None` for chunks
    /// stored by an earlier run; the store then accepts the segment on
    /// size alone.
    pub etag: Option<String>,
}

impl Manifest {
    /// Creates the layout for an object of `content_length` bytes.
    pub fn new(
        container: impl Into<String>,
        object_name: impl Into<String>,
        chunk_size: u64,
        content_length: u64,
    ) -> Result<Self, ManifestError> {
        let container = container.into();
        let object_name = object_name.into();
        if chunk_size == 0 {
            return Err(ManifestError::ZeroChunkSize);
        }
        if container.is_empty() {
            return Err(ManifestError::EmptyContainer);
        }
        if object_name.is_empty() {
            return Err(ManifestError::EmptyObjectName);
        }
        let count = content_length.div_ceil(chunk_size) as usize;
        Ok(Self {
            container,
            object_name,
            chunk_size,
            content_length,
            etags: vec![None; count],
        })
    }

    /// Object name of chunk `index`.
    ///
    /// The chunk size is part of the name, so chunks written with another
    /// chunk size are never mistaken for chunks of this layout.
    pub fn chunk_name(&self, index: usize) -> String {
        format!(
            "{}-chunk-{:0width$}-size-{}",
            self.object_name,
            index,
            self.chunk_size,
            width = CHUNK_INDEX_WIDTH
        )
    }

    /// Byte offset of chunk `index` within the logical object.
    pub fn chunk_offset(&self, index: usize) -> u64 {
        index as u64 * self.chunk_size
    }

    /// Length in bytes of chunk `index`. The last chunk may be short.
    pub fn chunk_len(&self, index: usize) -> u64 {
        let offset = self.chunk_offset(index);
        self.content_length
            .saturating_sub(offset)
            .min(self.chunk_size)
    }

    /// Records the etag returned by the store for chunk `index`.
    pub fn set_etag(&mut self, index: usize, etag: impl Into<String>) -> Result<(), ManifestError> {
        let count = self.etags.len();
        let slot = self
            .etags
            .get_mut(index)
            .ok_or(ManifestError::EtagOutOfRange { index, count })?;
        *slot = Some(etag.into());
        Ok(())
    }

    /// Manifest document entries, one per chunk in index order.
    pub fn segments(&self) -> Vec<Segment> {
        (0..self.chunk_count())
            .map(|index| Segment {
                path: format!("{}/{}", self.container, self.chunk_name(index)),
                size_bytes: self.chunk_len(index),
                etag: self.etags.get(index).cloned().flatten(),
            })
            .collect()
    }

    /// Serializes the manifest document uploaded as `object_name`.
    pub fn to_json(&self) -> Result<Vec<u8>, ManifestError> {
        Ok(serde_json::to_vec_pretty(&self.segments())?)
    }
}

impl ChunkLayout for Manifest {
    fn chunk_count(&self) -> usize {
        self.content_length.div_ceil(self.chunk_size) as usize
    }

    fn container(&self) -> &str {
        &self.container
    }

    fn chunk_name_pattern(&self) -> String {
        format!(
            r"^{}-chunk-(\d+)-size-{}$",
            regex::escape(&self.object_name),
            self.chunk_size
        )
    }
}
