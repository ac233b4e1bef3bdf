use std::time::Duration;

/// Base URL of the metadata API (organizations, projects, health).
pub const DEFAULT_API_BASE_URL: &str = "https://api.folders.nodehaus.io/api";

/// Base URL of the multipart upload API.
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://api.upload.nodehaus.io";

/// Platform tag sent with every created asset.
pub const DEFAULT_PLATFORM: &str = "comfyui";

/// Timeout for metadata and control calls (create, complete, abort, reads).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Part transfers get this multiple of the control timeout.
pub const PART_TIMEOUT_FACTOR: u32 = 2;

/// Timeout for the health probe.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Vendor API-key header attached to every request.
pub const HEADER_API_KEY: &str = "x-api-key";

/// Upload session id header on part transfers.
pub const HEADER_UPLOAD_ID: &str = "X-Upload-Id";

/// 1-based part number header on part transfers.
pub const HEADER_PART_NUMBER: &str = "X-Part-Number";

/// Storage key header on part transfers.
pub const HEADER_STORAGE_KEY: &str = "X-Key";

pub const CREATE_UPLOAD_PATH: &str = "/api/upload/create";
pub const UPLOAD_PART_PATH: &str = "/api/upload/part";
pub const COMPLETE_UPLOAD_PATH: &str = "/api/upload/complete";
pub const ABORT_UPLOAD_PATH: &str = "/api/upload/abort";

pub const ORGANIZATIONS_PATH: &str = "/organizations";
pub const PROJECTS_PATH: &str = "/projects";
pub const HEALTH_PATH: &str = "/health";
