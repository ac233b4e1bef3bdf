//! Safe path resolution and file deletion inside the output folder.

use std::path::{Path, PathBuf};

use crate::FileOpsError;
use crate::validation::relative_segments;

/// Joins a client-supplied `/`-separated relative path onto `root`.
///
/// Purely lexical; the result may not exist.
pub fn resolve_output_path(root: &Path, relative: &str) -> Result<PathBuf, FileOpsError> {
    let mut path = root.to_path_buf();
    path.extend(relative_segments(relative)?);
    Ok(path)
}

/// Deletes one file under `root`.
///
/// Safety checks:
/// 1. The relative path must be lexically safe.
/// 2. The file must exist.
/// 3. Its canonical path must be inside the canonical root (no symlink escape).
/// 4. It must not be a directory.
pub fn delete_output_file(root: &Path, relative: &str) -> Result<PathBuf, FileOpsError> {
    let path = resolve_output_path(root, relative)?;
    if !path.exists() {
        return Err(FileOpsError::NotFound(path));
    }

    let root_canon = std::fs::canonicalize(root)?;
    let abs = std::fs::canonicalize(&path)?;
    if !abs.starts_with(&root_canon) {
        return Err(FileOpsError::InvalidPath(format!(
            "resolves outside output directory: {}",
            abs.display()
        )));
    }
    if abs.is_dir() {
        return Err(FileOpsError::NotAFile(path));
    }

    std::fs::remove_file(&path)?;
    tracing::info!(path = %abs.display(), "deleted output file");
    Ok(abs)
}
