//! Chunked file reading for multipart uploads.
//!
//! Files are streamed from disk in fixed-size chunks so arbitrarily large
//! assets can be uploaded without buffering the whole file in memory.

mod chunked;
mod types;

pub use chunked::{ChunkReader, chunk_count};
pub use types::Chunk;

/// Default chunk size: 10 MiB.
///
/// Each chunk becomes one part of the remote multipart upload.
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file shrank while reading {path}: expected {expected} bytes, got {actual}")]
    Truncated {
        path: String,
        expected: u64,
        actual: u64,
    },
}
