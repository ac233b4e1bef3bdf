//! Output folder listing.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use assetmgr_protocol::types::extension_of;
use assetmgr_protocol::{AssetKind, FileTypeTable};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use crate::FileOpsError;

/// Characters left unescaped in view URLs: unreserved plus `/`.
const VIEW_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// A file in the output folder that can be uploaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputFile {
    /// File name (not full path).
    pub name: String,
    /// Path relative to the output root, always with `/` separators.
    pub path: String,
    /// Preview URL served by the host application.
    pub url: String,
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub modified: f64,
    pub file_type: AssetKind,
    /// Lowercased extension with leading dot.
    pub extension: String,
}

/// Lists every file under `root` whose extension is in `file_types`,
/// newest first. Unreadable entries are skipped.
pub fn list_output_files(
    root: &Path,
    file_types: &FileTypeTable,
) -> Result<Vec<OutputFile>, FileOpsError> {
    if !root.is_dir() {
        return Err(FileOpsError::OutputDirMissing(root.to_path_buf()));
    }

    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if let Some(file) = output_file(root, &path, file_types) {
                files.push(file);
            }
        }
    }

    files.sort_by(|a, b| b.modified.total_cmp(&a.modified));
    Ok(files)
}

fn output_file(root: &Path, path: &Path, file_types: &FileTypeTable) -> Option<OutputFile> {
    let extension = extension_of(path)?;
    let file_type = file_types.lookup(&extension)?;
    let metadata = std::fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }

    let relative = path
        .strip_prefix(root)
        .ok()?
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();

    Some(OutputFile {
        name: path.file_name()?.to_string_lossy().into_owned(),
        url: view_url(&relative),
        path: relative,
        size: metadata.len(),
        modified,
        file_type: file_type.kind,
        extension,
    })
}

/// Builds the `/view` URL for a `/`-separated relative path.
///
/// Files in subfolders carry a `subfolder` parameter.
pub fn view_url(relative: &str) -> String {
    match relative.rsplit_once('/') {
        Some((subfolder, name)) => format!(
            "/view?filename={}&subfolder={}&type=output",
            utf8_percent_encode(name, VIEW_PATH),
            utf8_percent_encode(subfolder, VIEW_PATH),
        ),
        None => format!(
            "/view?filename={}&type=output",
            utf8_percent_encode(relative, VIEW_PATH)
        ),
    }
}
