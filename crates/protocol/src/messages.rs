use serde::{Deserialize, Serialize};

use crate::types::AssetKind;

// ---------------------------------------------------------------------------
// Multipart upload protocol
// ---------------------------------------------------------------------------

/// Opens a multipart upload for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUploadRequest {
    pub organization_id: Option<String>,
    pub project_id: String,
    pub platform: String,
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub title: String,
    pub folder_id: String,
    pub metadata: Option<serde_json::Value>,
}

/// Identifiers assigned by the server; both are required by every later call.
///
/// Absent fields parse as empty so the session can reject them itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUploadResponse {
    #[serde(default)]
    pub upload_id: String,
    #[serde(default)]
    pub key: String,
}

/// Receipt for one transferred chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartResult {
    pub part_number: u32,
    pub etag: String,
}

/// Finalizes a multipart upload. `parts` must be in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadRequest {
    pub upload_id: String,
    pub key: String,
    pub parts: Vec<PartResult>,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub title: String,
    pub folder_id: String,
    pub organization_id: Option<String>,
    pub project_id: String,
    pub platform: String,
    pub metadata: serde_json::Value,
}

/// Discards a multipart upload and its stored parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortUploadRequest {
    pub upload_id: String,
    pub key: String,
}

// ---------------------------------------------------------------------------
// Metadata reads
// ---------------------------------------------------------------------------

/// An organization the API key has access to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Fields not modelled here, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A project (top-level folder) inside an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of `GET /organizations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationsResponse {
    #[serde(default)]
    pub organizations: Vec<Organization>,
}

/// Body of `GET /projects`. The API lists projects under `folders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectsResponse {
    #[serde(default)]
    pub folders: Vec<Project>,
}
