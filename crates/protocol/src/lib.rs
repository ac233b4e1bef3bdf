pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use messages::{
    AbortUploadRequest, CompleteUploadRequest, CreateUploadRequest, CreateUploadResponse,
    Organization, OrganizationsResponse, PartResult, Project, ProjectsResponse,
};
pub use types::{AssetKind, FileType, FileTypeTable};
