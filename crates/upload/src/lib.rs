//! Multipart upload orchestration.
//!
//! This crate implements the **business logic** for moving local files to
//! the remote asset API. It has no HTTP dependency of its own beyond the
//! [`UploadTransport`] implementation for the API client; tests drive it
//! with recording mocks.
//!
//! # Pipeline (per file)
//!
//! 1. **Inspect**: stat the file, classify it by extension
//! 2. **Create**: open a multipart upload, receive `uploadId` + `key`
//! 3. **Parts**: stream 10 MiB chunks, collecting `{partNumber, etag}`
//! 4. **Complete**: submit the ordered part list
//! 5. **Abort**: on any failure after step 2, discard the remote upload
//!
//! [`BatchCoordinator`] runs the pipeline over a list of files and folds
//! the outcomes into a [`BatchResult`].

pub mod batch;
pub mod error;
pub mod session;
pub mod source;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock;

// Re-export primary types for convenience.
pub use batch::BatchCoordinator;
pub use error::{ErrorKind, UploadError};
pub use session::{SessionReport, SessionState, UploadSession, upload_file};
pub use transport::UploadTransport;
pub use types::{
    AbortOutcome, AssetFile, BatchItem, BatchResult, BatchStatus, FileError, UploadEvent,
    UploadSettings, UploadTarget,
};
