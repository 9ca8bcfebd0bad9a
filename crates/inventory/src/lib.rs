//! Decides which chunks of an upload still have to be transferred.
//!
//! Before any chunk is sent, the driver builds an [`Inventory`] from the
//! manifest and the store, then calls [`Inventory::take_inventory`]. That
//! lists the container once, recognises chunk objects by the manifest's
//! naming pattern, and yields a [`ChunkInventory`] answering
//! "does chunk N need uploading?" for the rest of the run.
//!
//! Objects in the container that are not chunks of this upload (other
//! uploads, the previous manifest object, temp files) are ignored.

mod inventory;

pub use inventory::{ChunkInventory, Inventory, progress_line};

use slosync_store::StoreError;

/// Environmental failures while reconciling.
///
/// Misuse by the caller (querying a chunk index that does not exist) is
/// not represented here: it panics.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("unable to fetch container names: {0}")]
    Listing(#[from] StoreError),

    #[error("unable to compile chunk name pattern: {0}")]
    Pattern(#[from] regex::Error),
}
