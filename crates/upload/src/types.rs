//! Upload configuration and results.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// What to upload and where.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Local file to upload.
    pub source: PathBuf,
    /// Destination container.
    pub container: String,
    /// Name of the manifest object; chunk names derive from it.
    pub object_name: String,
    /// Chunk size in bytes.
    pub chunk_size: u64,
    /// Re-upload every chunk, ignoring what is already stored.
    pub overwrite: bool,
}

impl UploadConfig {
    /// Config for `source`, named after its file name.
    pub fn new(source: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        let source = source.into();
        let object_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source,
            container: container.into(),
            object_name,
            chunk_size: slosync_transfer::DEFAULT_CHUNK_SIZE,
            overwrite: false,
        }
    }
}

/// Outcome of a completed upload run.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub container: String,
    pub object_name: String,
    pub content_length: u64,
    pub chunks_total: usize,
    pub chunks_uploaded: usize,
    pub chunks_skipped: usize,
    /// Bytes sent, including the manifest object.
    pub bytes_sent: u64,
    /// Etag of the manifest object.
    pub manifest_etag: String,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
