//! Chunked reads of a local source file and upload progress tracking.

mod chunked;
mod progress;
mod types;

pub use chunked::{ChunkReader, checksum_bytes};
pub use progress::{DEFAULT_SPEED_WINDOW, SpeedCalculator, UploadStats};
pub use types::{Chunk, UploadStatus};

/// Default chunk size: 64 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 64 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk {index} out of range ({count} chunks)")]
    ChunkOutOfRange { index: usize, count: usize },

    #[error("source shrank while reading: expected {expected} bytes at offset {offset}")]
    ShortRead { offset: u64, expected: u64 },
}
