//! Chunk layout of a large object and its manifest document.
//!
//! A [`Manifest`] describes how a single logical object is split into
//! fixed-size chunks, how each chunk object is named inside the container,
//! and how the final manifest object lists those chunks.

mod layout;
mod manifest;

pub use layout::ChunkLayout;
pub use manifest::{Manifest, Segment};

/// Number of decimal digits used for the chunk index in chunk object names.
pub const CHUNK_INDEX_WIDTH: usize = 8;

/// Errors produced while building or serializing a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("object name must not be empty")]
    EmptyObjectName,

    #[error("container name must not be empty")]
    EmptyContainer,

    #[error("etag index {index} out of range ({count} chunks)")]
    EtagOutOfRange { index: usize, count: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
