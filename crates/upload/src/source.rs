//! Local file inspection.

use std::path::{Path, PathBuf};

use assetmgr_protocol::FileTypeTable;
use assetmgr_protocol::types::extension_of;

use crate::error::UploadError;
use crate::types::AssetFile;

impl AssetFile {
    /// Stats `path` and classifies it by extension.
    ///
    /// Does not read the contents. Unknown extensions get the fallback type.
    pub fn inspect(path: &Path, file_types: &FileTypeTable) -> Result<Self, UploadError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(UploadError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(UploadError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }

        let path = std::path::absolute(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_type = file_types.classify(&path);

        Ok(Self {
            extension: extension_of(&path),
            kind: file_type.kind,
            content_type: file_type.content_type,
            size: metadata.len(),
            filename,
            path,
        })
    }

    /// [`AssetFile::inspect`] on the blocking pool.
    pub async fn inspect_blocking(
        path: PathBuf,
        file_types: FileTypeTable,
    ) -> Result<Self, UploadError> {
        tokio::task::spawn_blocking(move || Self::inspect(&path, &file_types))
            .await
            .map_err(std::io::Error::other)?
    }
}
