use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::TransferError;
use crate::types::Chunk;

// ---------------------------------------------------------------------------
// Checksum helpers
// ---------------------------------------------------------------------------

/// Computes SHA-256 of `data` and returns the hex-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a local file as a sequence of fixed-size, numbered chunks.
///
/// Chunks can be read in order with [`next_chunk`](Self::next_chunk) or
/// individually with [`read_chunk`](Self::read_chunk), so a resumed upload
/// never reads chunks that are already stored remotely.
pub struct ChunkReader {
    file: std::fs::File,
    path: PathBuf,
    chunk_size: u64,
    file_size: u64,
    next_index: usize,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    pub fn new(path: &Path, chunk_size: u64) -> Result<Self, TransferError> {
        if chunk_size == 0 {
            return Err(TransferError::ZeroChunkSize);
        }
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();
        Ok(Self {
            file,
            path: path.to_path_buf(),
            chunk_size,
            file_size,
            next_index: 0,
        })
    }

    /// Number of chunks in the file.
    pub fn chunk_count(&self) -> usize {
        self.file_size.div_ceil(self.chunk_size) as usize
    }

    /// Positions the reader so the next sequential read returns chunk `index`.
    pub fn seek_to_chunk(&mut self, index: usize) -> Result<(), TransferError> {
        let count = self.chunk_count();
        if index > count {
            return Err(TransferError::ChunkOutOfRange { index, count });
        }
        self.file
            .seek(SeekFrom::Start(index as u64 * self.chunk_size))?;
        self.next_index = index;
        Ok(())
    }

    /// Reads chunk `index` regardless of the current position.
    pub fn read_chunk(&mut self, index: usize) -> Result<Chunk, TransferError> {
        let count = self.chunk_count();
        if index >= count {
            return Err(TransferError::ChunkOutOfRange { index, count });
        }
        self.seek_to_chunk(index)?;
        match self.next_chunk()? {
            Some(chunk) => Ok(chunk),
            None => Err(TransferError::ShortRead {
                offset: index as u64 * self.chunk_size,
                expected: self.chunk_size,
            }),
        }
    }

    /// Reads the next chunk. Returns `None` after the last chunk.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, TransferError> {
        let offset = self.next_index as u64 * self.chunk_size;
        let remaining = self.file_size.saturating_sub(offset);
        if remaining == 0 {
            return Ok(None);
        }

        let expected = remaining.min(self.chunk_size);
        let mut buf = Vec::with_capacity(expected as usize);
        let n = (&mut self.file).take(expected).read_to_end(&mut buf)? as u64;
        if n < expected {
            return Err(TransferError::ShortRead { offset, expected });
        }

        let chunk = Chunk {
            index: self.next_index,
            offset,
            data: buf,
        };
        self.next_index += 1;
        Ok(Some(chunk))
    }

    /// Total file size in bytes, as seen when the reader was opened.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Path of the source file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(data).unwrap();
        path
    }

    #[test]
    fn checksum_bytes_deterministic() {
        let c1 = checksum_bytes(b"hello world");
        let c2 = checksum_bytes(b"hello world");
        assert_eq!(c1, c2);
        assert_eq!(c1.len(), 64); // SHA-256 = 64 hex chars.
    }

    #[test]
    fn checksum_bytes_different_data() {
        assert_ne!(checksum_bytes(b"hello"), checksum_bytes(b"world"));
    }

    #[test]
    fn reads_all_chunks_in_order() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "src.bin", b"AABBCCDDEE");

        let mut reader = ChunkReader::new(&path, 4).unwrap();
        assert_eq!(reader.file_size(), 10);
        assert_eq!(reader.chunk_count(), 3);

        let c0 = reader.next_chunk().unwrap().unwrap();
        assert_eq!((c0.index, c0.offset), (0, 0));
        assert_eq!(&c0.data, b"AABB");

        let c1 = reader.next_chunk().unwrap().unwrap();
        assert_eq!((c1.index, c1.offset), (1, 4));
        assert_eq!(&c1.data, b"CCDD");

        let c2 = reader.next_chunk().unwrap().unwrap();
        assert_eq!((c2.index, c2.offset), (2, 8));
        assert_eq!(&c2.data, b"EE");

        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn read_chunk_random_access() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "src.bin", b"0123456789");

        let mut reader = ChunkReader::new(&path, 3).unwrap();
        assert_eq!(&reader.read_chunk(3).unwrap().data, b"9");
        assert_eq!(&reader.read_chunk(1).unwrap().data, b"345");
        // Sequential reads continue after the last random read.
        assert_eq!(reader.next_chunk().unwrap().unwrap().index, 2);
    }

    #[test]
    fn read_chunk_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "src.bin", b"0123");

        let mut reader = ChunkReader::new(&path, 2).unwrap();
        assert!(matches!(
            reader.read_chunk(2),
            Err(TransferError::ChunkOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn seek_to_chunk_resumes() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "src.bin", b"0123456789");

        let mut reader = ChunkReader::new(&path, 4).unwrap();
        reader.seek_to_chunk(2).unwrap();
        let c = reader.next_chunk().unwrap().unwrap();
        assert_eq!(c.offset, 8);
        assert_eq!(&c.data, b"89");
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn empty_file_has_no_chunks() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "empty.bin", b"");

        let mut reader = ChunkReader::new(&path, 4).unwrap();
        assert_eq!(reader.chunk_count(), 0);
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "src.bin", b"x");
        assert!(matches!(
            ChunkReader::new(&path, 0),
            Err(TransferError::ZeroChunkSize)
        ));
    }

    #[test]
    fn truncated_source_is_detected() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "src.bin", b"0123456789");

        let mut reader = ChunkReader::new(&path, 4).unwrap();
        std::fs::File::create(&path).unwrap().write_all(b"0123").unwrap();

        assert!(matches!(
            reader.read_chunk(1),
            Err(TransferError::ShortRead { offset: 4, .. })
        ));
    }
}
