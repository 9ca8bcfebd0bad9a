/// One numbered chunk of the source file.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Zero-based chunk index.
    pub index: usize,
    /// Byte offset within the source file.
    pub offset: u64,
    /// Raw chunk data.
    pub data: Vec<u8>,
}

impl Chunk {
    /// Size of this chunk in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Lifecycle of one upload run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}
