use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Asset family reported to the remote API in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "3D")]
    Model3d,
}

impl AssetKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
            AssetKind::Audio => "audio",
            AssetKind::Text => "text",
            AssetKind::Model3d => "3D",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset family and canonical MIME type for one extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileType {
    pub kind: AssetKind,
    pub content_type: &'static str,
}

impl FileType {
    /// Used for every extension the table does not know.
    ///
    /// Unknown files are still uploaded, labelled as images with an opaque
    /// body type.
    pub const FALLBACK: FileType = FileType {
        kind: AssetKind::Image,
        content_type: "application/octet-stream",
    };
}

const STANDARD_TYPES: &[(&str, AssetKind, &str)] = &[
    ("png", AssetKind::Image, "image/png"),
    ("jpg", AssetKind::Image, "image/jpeg"),
    ("jpeg", AssetKind::Image, "image/jpeg"),
    ("gif", AssetKind::Image, "image/gif"),
    ("webp", AssetKind::Image, "image/webp"),
    ("bmp", AssetKind::Image, "image/bmp"),
    ("svg", AssetKind::Image, "image/svg+xml"),
    ("mp4", AssetKind::Video, "video/mp4"),
    ("mov", AssetKind::Video, "video/quicktime"),
    ("avi", AssetKind::Video, "video/x-msvideo"),
    ("mkv", AssetKind::Video, "video/x-matroska"),
    ("txt", AssetKind::Text, "text/plain"),
    ("json", AssetKind::Text, "application/json"),
    ("mp3", AssetKind::Audio, "audio/mpeg"),
    ("wav", AssetKind::Audio, "audio/wav"),
    ("flac", AssetKind::Audio, "audio/flac"),
    ("obj", AssetKind::Model3d, "model/obj"),
    ("fbx", AssetKind::Model3d, "model/fbx"),
    ("gltf", AssetKind::Model3d, "model/gltf+json"),
    ("glb", AssetKind::Model3d, "model/gltf-binary"),
];

/// Extension to file-type lookup, built once at startup and shared by
/// reference.
#[derive(Debug, Clone)]
pub struct FileTypeTable {
    entries: HashMap<String, FileType>,
}

impl Default for FileTypeTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl FileTypeTable {
    /// The image/video/audio/text/3D families known to the asset API.
    pub fn standard() -> Self {
        let entries = STANDARD_TYPES
            .iter()
            .map(|&(ext, kind, content_type)| (ext.to_string(), FileType { kind, content_type }))
            .collect();
        Self { entries }
    }

    /// Looks up an extension (with or without the leading dot, any case).
    pub fn lookup(&self, extension: &str) -> Option<FileType> {
        let ext = extension.trim_start_matches('.').to_lowercase();
        self.entries.get(&ext).copied()
    }

    /// Classifies a path by extension, falling back to [`FileType::FALLBACK`].
    pub fn classify(&self, path: &Path) -> FileType {
        extension_of(path)
            .and_then(|ext| self.lookup(&ext))
            .unwrap_or(FileType::FALLBACK)
    }

    /// Whether the path's extension is in the table.
    pub fn is_known(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.lookup(&ext).is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercased extension with a leading dot (`".png"`), or `None`.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
}
