//! Upload error types.

/// Errors produced during an upload run.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest error: {0}")]
    Manifest(#[from] slosync_manifest::ManifestError),

    #[error("inventory failed: {0}")]
    Inventory(#[from] slosync_inventory::InventoryError),

    #[error("store error: {0}")]
    Store(#[from] slosync_store::StoreError),

    #[error("transfer error: {0}")]
    Transfer(#[from] slosync_transfer::TransferError),

    #[error("source changed during upload: expected {expected} bytes, found {actual}")]
    SourceChanged { expected: u64, actual: u64 },
}
