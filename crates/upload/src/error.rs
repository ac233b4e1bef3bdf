//! Upload error types.

use std::path::PathBuf;

use assetmgr_transfer::TransferError;

/// Broad failure category, used for reporting and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Transport,
    Application,
    Io,
    InvalidTarget,
}

/// Errors produced while uploading a file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File not found")]
    NotFound(PathBuf),

    /// Network failure, timeout or non-2xx response.
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// 2xx response reporting a failure.
    #[error("{0}")]
    Application(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("read error: {0}")]
    Transfer(#[from] TransferError),

    #[error("{0}")]
    InvalidTarget(String),
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::NotFound(_) => ErrorKind::NotFound,
            UploadError::Transport { .. } => ErrorKind::Transport,
            UploadError::Application(_) => ErrorKind::Application,
            UploadError::Io(_) | UploadError::Transfer(_) => ErrorKind::Io,
            UploadError::InvalidTarget(_) => ErrorKind::InvalidTarget,
        }
    }
}

impl From<assetmgr_api::Error> for UploadError {
    fn from(err: assetmgr_api::Error) -> Self {
        match err {
            assetmgr_api::Error::Application(message) => UploadError::Application(message),
            other => UploadError::Transport {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
