//! Transport seam between the session logic and the remote API.

use std::future::Future;
use std::pin::Pin;

use assetmgr_api::Client;
use assetmgr_protocol::messages::{
    AbortUploadRequest, CompleteUploadRequest, CreateUploadRequest, CreateUploadResponse,
    PartResult,
};

use crate::error::UploadError;

/// Boxed future returned by [`UploadTransport`] calls.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UploadError>> + Send + 'a>>;

/// The four multipart protocol calls.
///
/// Implemented by [`assetmgr_api::Client`]; tests substitute a recording mock.
pub trait UploadTransport: Send + Sync {
    fn create_upload<'a>(
        &'a self,
        req: &'a CreateUploadRequest,
    ) -> TransportFuture<'a, CreateUploadResponse>;

    /// Sends one chunk. `data` is moved into the request body.
    fn upload_part<'a>(
        &'a self,
        upload_id: &'a str,
        key: &'a str,
        part_number: u32,
        data: Vec<u8>,
    ) -> TransportFuture<'a, PartResult>;

    fn complete_upload<'a>(
        &'a self,
        req: &'a CompleteUploadRequest,
    ) -> TransportFuture<'a, serde_json::Value>;

    fn abort_upload<'a>(&'a self, req: &'a AbortUploadRequest) -> TransportFuture<'a, ()>;
}

impl UploadTransport for Client {
    fn create_upload<'a>(
        &'a self,
        req: &'a CreateUploadRequest,
    ) -> TransportFuture<'a, CreateUploadResponse> {
        Box::pin(async move { Ok(Client::create_upload(self, req).await?) })
    }

    fn upload_part<'a>(
        &'a self,
        upload_id: &'a str,
        key: &'a str,
        part_number: u32,
        data: Vec<u8>,
    ) -> TransportFuture<'a, PartResult> {
        Box::pin(async move { Ok(Client::upload_part(self, upload_id, key, part_number, data).await?) })
    }

    fn complete_upload<'a>(
        &'a self,
        req: &'a CompleteUploadRequest,
    ) -> TransportFuture<'a, serde_json::Value> {
        Box::pin(async move { Ok(Client::complete_upload(self, req).await?) })
    }

    fn abort_upload<'a>(&'a self, req: &'a AbortUploadRequest) -> TransportFuture<'a, ()> {
        Box::pin(async move { Ok(Client::abort_upload(self, req).await?) })
    }
}
