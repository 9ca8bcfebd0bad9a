//! Upload driver for one chunked object.
//!
//! Takes inventory of the destination container, sends only the chunks that
//! are not stored yet, then writes the manifest object.

use std::time::Duration;

use slosync_inventory::{ChunkInventory, Inventory};
use slosync_manifest::{ChunkLayout, Manifest};
use slosync_store::ObjectStore;
use slosync_transfer::{ChunkReader, SpeedCalculator, UploadStats};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

use crate::error::UploadError;
use crate::types::{UploadConfig, UploadReport};

/// Drives chunked uploads against one store.
pub struct SloUpload<'a, S: ?Sized> {
    store: &'a S,
    output: UnboundedSender<String>,
}

impl<'a, S: ObjectStore + ?Sized> SloUpload<'a, S> {
    /// Creates a driver. Human-readable progress lines go to `output`.
    pub fn new(store: &'a S, output: UnboundedSender<String>) -> Self {
        Self { store, output }
    }

    /// Reports which chunks of `config.source` are still missing remotely,
    /// without uploading anything.
    pub fn status(&self, config: &UploadConfig) -> Result<ChunkInventory, UploadError> {
        let reader = ChunkReader::new(&config.source, config.chunk_size)?;
        let manifest = manifest_for(config, reader.file_size())?;
        let inventory =
            Inventory::new(&manifest, self.store, false, self.output.clone()).take_inventory()?;
        Ok(inventory)
    }

    /// Uploads `config.source`, skipping chunks already in the container.
    ///
    /// The manifest object is always written last, even when every chunk
    /// was already present.
    pub fn run(&self, config: &UploadConfig) -> Result<UploadReport, UploadError> {
        let mut reader = ChunkReader::new(&config.source, config.chunk_size)?;
        let mut manifest = manifest_for(config, reader.file_size())?;
        let mut stats = UploadStats::new(manifest.chunk_count());

        info!(
            container = %manifest.container,
            object = %manifest.object_name,
            bytes = manifest.content_length,
            chunks = manifest.chunk_count(),
            overwrite = config.overwrite,
            "starting upload"
        );

        stats.start();
        match self.upload(&mut reader, &mut manifest, &mut stats, config.overwrite) {
            Ok(manifest_etag) => {
                stats.complete();
                info!(
                    object = %manifest.object_name,
                    uploaded = stats.chunks_uploaded(),
                    skipped = stats.chunks_skipped(),
                    bytes = stats.bytes_sent(),
                    "upload completed"
                );
                Ok(UploadReport {
                    container: manifest.container.clone(),
                    object_name: manifest.object_name.clone(),
                    content_length: manifest.content_length,
                    chunks_total: stats.chunks_total(),
                    chunks_uploaded: stats.chunks_uploaded(),
                    chunks_skipped: stats.chunks_skipped(),
                    bytes_sent: stats.bytes_sent(),
                    manifest_etag,
                    elapsed: stats.elapsed(),
                })
            }
            Err(e) => {
                stats.fail(&e.to_string());
                error!(
                    object = %manifest.object_name,
                    uploaded = stats.chunks_uploaded(),
                    remaining = stats.chunks_remaining(),
                    error = %e,
                    "upload failed"
                );
                Err(e)
            }
        }
    }

    fn upload(
        &self,
        reader: &mut ChunkReader,
        manifest: &mut Manifest,
        stats: &mut UploadStats,
        overwrite: bool,
    ) -> Result<String, UploadError> {
        let container = manifest.container.clone();
        self.store.create_container(&container)?;

        let inventory =
            Inventory::new(&*manifest, self.store, overwrite, self.output.clone()).take_inventory()?;

        let mut remaining_bytes: u64 = inventory.pending().map(|i| manifest.chunk_len(i)).sum();
        let mut speed = SpeedCalculator::default();
        speed.start();
        let total = inventory.chunk_count();
        for index in 0..total {
            if !inventory.should_upload(index) {
                stats.chunk_skipped();
                continue;
            }

            let chunk = reader.read_chunk(index)?;
            let name = manifest.chunk_name(index);
            let etag = self.store.put_object(&container, &name, &chunk.data)?;
            manifest.set_etag(index, etag)?;

            stats.chunk_uploaded(chunk.size());
            speed.record(chunk.size());
            remaining_bytes = remaining_bytes.saturating_sub(chunk.size());
            let eta = speed.eta(remaining_bytes);
            debug!(
                chunk = index,
                bytes = chunk.size(),
                remaining = stats.chunks_remaining(),
                bytes_per_sec = speed.bytes_per_second().unwrap_or_default(),
                eta_secs = eta.map(|d| d.as_secs()),
                "chunk uploaded"
            );
            let _ = self.output.send(chunk_line(index, total, eta));
        }

        // Chunks already read may no longer match the source.
        let actual = std::fs::metadata(reader.path())?.len();
        if actual != manifest.content_length {
            return Err(UploadError::SourceChanged {
                expected: manifest.content_length,
                actual,
            });
        }

        let document = manifest.to_json()?;
        let etag = self
            .store
            .put_object(&container, &manifest.object_name, &document)?;
        stats.add_bytes(document.len() as u64);
        let _ = self.output.send(format!(
            "Uploaded manifest {}/{}.\n",
            container, manifest.object_name
        ));
        Ok(etag)
    }
}

/// Progress line for a finished chunk, with the remaining time once it is
/// known and non-zero.
fn chunk_line(index: usize, total: usize, eta: Option<Duration>) -> String {
    match eta.map(|d| d.as_secs()) {
        Some(secs) if secs > 0 => {
            format!("Uploaded chunk {} of {total} (about {secs}s left).\n", index + 1)
        }
        _ => format!("Uploaded chunk {} of {total}.\n", index + 1),
    }
}

fn manifest_for(config: &UploadConfig, content_length: u64) -> Result<Manifest, UploadError> {
    Ok(Manifest::new(
        config.container.clone(),
        config.object_name.clone(),
        config.chunk_size,
        content_length,
    )?)
}
