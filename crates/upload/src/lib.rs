//! Resumable upload of one large object as numbered chunks.
//!
//! # Pipeline
//!
//! 1. **Layout**: size the source and derive the chunk manifest
//! 2. **Inventory**: list the container and find chunks already stored
//! 3. **Upload**: send only the missing chunks
//! 4. **Commit**: always write the manifest object last
//!
//! An interrupted run leaves whole chunks behind; the next run picks up
//! where it stopped.

pub mod error;
pub mod types;
pub mod upload;

pub use error::UploadError;
pub use types::{UploadConfig, UploadReport};
pub use upload::SloUpload;
