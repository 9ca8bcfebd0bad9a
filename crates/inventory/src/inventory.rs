use regex::Regex;
use slosync_manifest::ChunkLayout;
use slosync_store::ObjectLister;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace};

use crate::InventoryError;

/// Human-readable progress line sent once reconciliation completes.
pub fn progress_line(pending: usize) -> String {
    format!("{pending} chunks need uploading. Additionally, manifest file is always re-uploaded.\n")
}

/// An upload whose remote state has not been inspected yet.
///
/// Holds borrowed views of the manifest and the listing source; neither is
/// mutated. Reconciling produces a [`ChunkInventory`], the only type that
/// answers per-chunk queries.
pub struct Inventory<'a, M: ?Sized, L: ?Sized> {
    layout: &'a M,
    lister: &'a L,
    overwrite: bool,
    output: UnboundedSender<String>,
}

impl<'a, M, L> Inventory<'a, M, L>
where
    M: ChunkLayout + ?Sized,
    L: ObjectLister + ?Sized,
{
    /// Creates an inventory. No I/O happens until [`take_inventory`](Self::take_inventory).
    ///
    /// With `overwrite` set, remote state is ignored and every chunk is
    /// uploaded again.
    pub fn new(layout: &'a M, lister: &'a L, overwrite: bool, output: UnboundedSender<String>) -> Self {
        Self {
            layout,
            lister,
            overwrite,
            output,
        }
    }

    /// Lists the container and decides which chunks still need uploading.
    ///
    /// Each call starts from "every chunk needed", so retrying after a
    /// failed listing is safe.
    pub fn take_inventory(&self) -> Result<ChunkInventory, InventoryError> {
        let chunk_count = self.layout.chunk_count();
        let mut inventory = ChunkInventory::all_pending(chunk_count);
        if self.overwrite {
            info!(chunks = chunk_count, "overwrite requested, skipping remote inventory");
            return Ok(inventory);
        }

        let container = self.layout.container();
        let names = self.lister.object_names(container)?;
        let pattern = Regex::new(&self.layout.chunk_name_pattern())?;

        let mut ignored = 0usize;
        for name in &names {
            match chunk_index(&pattern, name) {
                Some(index) if index < chunk_count => inventory.mark_present(index),
                Some(index) => {
                    trace!(name = %name, index, chunk_count, "chunk index beyond chunk count");
                    ignored += 1;
                }
                None => {
                    trace!(name = %name, "not a chunk of this upload");
                    ignored += 1;
                }
            }
        }

        debug!(
            container,
            listed = names.len(),
            ignored,
            present = inventory.present_count(),
            pending = inventory.pending_count(),
            "inventory taken"
        );

        // A dropped receiver only means nobody is watching progress.
        let _ = self.output.send(progress_line(inventory.pending_count()));
        Ok(inventory)
    }
}

/// Extracts the chunk index from `name`, if it is a chunk object name.
fn chunk_index(pattern: &Regex, name: &str) -> Option<usize> {
    pattern.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Per-chunk upload decisions for one run.
///
/// Immutable once produced, so it can be shared read-only across upload
/// workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInventory {
    needs_upload: Vec<bool>,
    pending: usize,
}

impl ChunkInventory {
    /// Every chunk needs uploading.
    fn all_pending(chunk_count: usize) -> Self {
        Self {
            needs_upload: vec![true; chunk_count],
            pending: chunk_count,
        }
    }

    fn mark_present(&mut self, index: usize) {
        if std::mem::replace(&mut self.needs_upload[index], false) {
            self.pending -= 1;
        }
    }

    /// Total number of chunks in the upload.
    pub fn chunk_count(&self) -> usize {
        self.needs_upload.len()
    }

    /// Number of chunks that still need uploading.
    pub fn pending_count(&self) -> usize {
        self.pending
    }

    /// Number of chunks already present remotely.
    pub fn present_count(&self) -> usize {
        self.chunk_count() - self.pending
    }

    /// Whether chunk `index` needs uploading.
    ///
    /// # Panics
    ///
    /// If `index` is not a chunk of this upload.
    pub fn should_upload(&self, index: usize) -> bool {
        match self.needs_upload.get(index) {
            Some(needed) => *needed,
            None => panic!(
                "should_upload() called with invalid chunk index {index} (only {} chunks)",
                self.chunk_count()
            ),
        }
    }

    /// Indices of chunks that still need uploading, ascending.
    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.needs_upload
            .iter()
            .enumerate()
            .filter_map(|(index, needed)| needed.then_some(index))
    }
}
