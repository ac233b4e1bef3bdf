//! Local output folder operations.
//!
//! Lists uploadable files, resolves client-supplied relative paths and
//! deletes files, never touching anything outside the output root.

mod browse;
mod delete;
mod validation;

pub use browse::{OutputFile, list_output_files, view_url};
pub use delete::{delete_output_file, resolve_output_path};
pub use validation::relative_segments;

use std::path::PathBuf;

/// Errors produced by output folder operations.
#[derive(Debug, thiserror::Error)]
pub enum FileOpsError {
    #[error("Output directory not found")]
    OutputDirMissing(PathBuf),

    /// Traversal, absolute path or symlink escape. The reason is logged only.
    #[error("Invalid file path - security violation")]
    InvalidPath(String),

    #[error("File not found")]
    NotFound(PathBuf),

    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
