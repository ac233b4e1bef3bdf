//! Data types for the upload flow.

use std::path::PathBuf;

use assetmgr_protocol::constants::DEFAULT_PLATFORM;
use assetmgr_protocol::{AssetKind, FileTypeTable};
use assetmgr_transfer::DEFAULT_CHUNK_SIZE;
use serde::Serialize;

use crate::error::UploadError;

/// Process-wide upload settings, built once at startup and passed by
/// reference.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Bytes per part.
    pub chunk_size: usize,
    /// Platform tag sent with every asset.
    pub platform: String,
    /// Extension to asset-kind / MIME lookup.
    pub file_types: FileTypeTable,
    /// Sessions a batch may run at once (1 = strictly sequential).
    pub max_concurrent_sessions: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            platform: DEFAULT_PLATFORM.to_string(),
            file_types: FileTypeTable::standard(),
            max_concurrent_sessions: 1,
        }
    }
}

/// Where uploaded assets land. Shared by every file in a batch.
///
/// The folder id falls back to the project id, so it is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTarget {
    project_id: String,
    folder_id: String,
    organization_id: Option<String>,
    metadata: Option<serde_json::Value>,
}

impl UploadTarget {
    /// Targets the root folder of `project_id`.
    pub fn new(project_id: impl Into<String>) -> Result<Self, UploadError> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(UploadError::InvalidTarget("Project ID is required".into()));
        }
        Ok(Self {
            folder_id: project_id.clone(),
            project_id,
            organization_id: None,
            metadata: None,
        })
    }

    /// Targets a folder inside the project. `None` or empty keeps the root.
    pub fn with_folder(mut self, folder_id: Option<String>) -> Self {
        if let Some(folder) = folder_id.filter(|f| !f.is_empty()) {
            self.folder_id = folder;
        }
        self
    }

    pub fn with_organization(mut self, organization_id: Option<String>) -> Self {
        self.organization_id = organization_id.filter(|o| !o.is_empty());
        self
    }

    /// Attaches caller metadata (e.g. the workflow that produced the asset).
    pub fn with_metadata(mut self, metadata: Option<serde_json::Value>) -> Self {
        self.metadata = metadata.filter(|m| !m.is_null());
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }
}

/// A local file prepared for upload. Immutable once inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFile {
    pub path: PathBuf,
    pub size: u64,
    pub filename: String,
    /// Lowercased extension with leading dot, if any.
    pub extension: Option<String>,
    pub kind: AssetKind,
    pub content_type: &'static str,
}

/// One entry of a batch: the caller's reference (reported back in errors)
/// and the resolved local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub reference: String,
    pub path: PathBuf,
}

impl BatchItem {
    pub fn new(reference: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            path: path.into(),
        }
    }
}

impl From<PathBuf> for BatchItem {
    fn from(path: PathBuf) -> Self {
        Self {
            reference: path.to_string_lossy().into_owned(),
            path,
        }
    }
}

/// Result of the compensating abort call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum AbortOutcome {
    /// No remote upload existed, or the session succeeded.
    NotNeeded,
    /// The abort request was accepted.
    Aborted,
    /// The abort request failed; the message is logged, never propagated.
    Failed(String),
}

/// Overall status of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// No file failed (including the empty batch).
    Success,
    /// Some files failed, some succeeded.
    Partial,
    /// Every file failed.
    Failure,
}

impl BatchStatus {
    pub fn from_counts(successful: usize, failed: usize) -> Self {
        match (successful, failed) {
            (_, 0) => BatchStatus::Success,
            (0, _) => BatchStatus::Failure,
            _ => BatchStatus::Partial,
        }
    }
}

/// A failed file in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// Aggregated outcome of a batch upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<FileError>,
    pub message: String,
}

impl BatchResult {
    /// Empty accumulator for `total` files.
    pub fn new(total: usize) -> Self {
        Self {
            status: BatchStatus::Success,
            total,
            successful: 0,
            failed: 0,
            errors: Vec::new(),
            message: String::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    pub fn record_failure(&mut self, file: impl Into<String>, error: impl Into<String>) {
        self.failed += 1;
        self.errors.push(FileError {
            file: file.into(),
            error: error.into(),
        });
    }

    /// Sets the status and summary once every file has resolved.
    pub fn finalize(&mut self) {
        self.status = BatchStatus::from_counts(self.successful, self.failed);
        self.message = format!(
            "Uploaded {}/{} assets successfully",
            self.successful, self.total
        );
    }
}

/// Progress and outcome records emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    FileStarted {
        file: String,
    },
    PartUploaded {
        file: String,
        part_number: u32,
        bytes: usize,
    },
    FileSucceeded {
        file: String,
    },
    FileFailed {
        file: String,
        error: String,
    },
    BatchFinished(BatchResult),
}
