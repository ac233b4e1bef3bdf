//! Recording transport shared by the session and batch tests.

use std::sync::Mutex;

use assetmgr_protocol::messages::{
    AbortUploadRequest, CompleteUploadRequest, CreateUploadRequest, CreateUploadResponse,
    PartResult,
};

use crate::error::UploadError;
use crate::transport::{TransportFuture, UploadTransport};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create { file_name: String },
    Part { upload_id: String, part_number: u32, len: usize },
    Complete { upload_id: String, parts: Vec<u32> },
    Abort { upload_id: String, key: String },
}

/// Answers every call successfully unless told to fail a step.
///
/// Upload ids and keys are derived from the file name so concurrent sessions
/// stay distinguishable.
#[derive(Default)]
pub(crate) struct MockTransport {
    calls: Mutex<Vec<Call>>,
    creates: Mutex<Vec<CreateUploadRequest>>,
    completes: Mutex<Vec<CompleteUploadRequest>>,
    fail_create: bool,
    fail_part: Option<u32>,
    fail_complete: bool,
    fail_abort: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Fails every part with this number, in every session.
    pub fn fail_part(mut self, part_number: u32) -> Self {
        self.fail_part = Some(part_number);
        self
    }

    pub fn fail_complete(mut self) -> Self {
        self.fail_complete = true;
        self
    }

    pub fn fail_abort(mut self) -> Self {
        self.fail_abort = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn part_sizes(&self) -> Vec<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Part { len, .. } => Some(*len),
                _ => None,
            })
            .collect()
    }

    pub fn last_create(&self) -> Option<CreateUploadRequest> {
        self.creates.lock().unwrap().last().cloned()
    }

    pub fn last_complete(&self) -> Option<CompleteUploadRequest> {
        self.completes.lock().unwrap().last().cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl UploadTransport for MockTransport {
    fn create_upload<'a>(
        &'a self,
        req: &'a CreateUploadRequest,
    ) -> TransportFuture<'a, CreateUploadResponse> {
        self.record(Call::Create {
            file_name: req.file_name.clone(),
        });
        self.creates.lock().unwrap().push(req.clone());
        let fail = self.fail_create;
        Box::pin(async move {
            tokio::task::yield_now().await;
            if fail {
                return Err(UploadError::Application("Invalid project".into()));
            }
            Ok(CreateUploadResponse {
                upload_id: format!("up-{}", req.file_name),
                key: format!("assets/{}", req.file_name),
            })
        })
    }

    fn upload_part<'a>(
        &'a self,
        upload_id: &'a str,
        _key: &'a str,
        part_number: u32,
        data: Vec<u8>,
    ) -> TransportFuture<'a, PartResult> {
        self.record(Call::Part {
            upload_id: upload_id.to_string(),
            part_number,
            len: data.len(),
        });
        let fail = self.fail_part == Some(part_number);
        Box::pin(async move {
            tokio::task::yield_now().await;
            if fail {
                return Err(UploadError::Transport {
                    status: None,
                    message: "request timed out after 60s".into(),
                });
            }
            Ok(PartResult {
                part_number,
                etag: format!("etag-{part_number}"),
            })
        })
    }

    fn complete_upload<'a>(
        &'a self,
        req: &'a CompleteUploadRequest,
    ) -> TransportFuture<'a, serde_json::Value> {
        self.record(Call::Complete {
            upload_id: req.upload_id.clone(),
            parts: req.parts.iter().map(|p| p.part_number).collect(),
        });
        self.completes.lock().unwrap().push(req.clone());
        let fail = self.fail_complete;
        Box::pin(async move {
            if fail {
                return Err(UploadError::Transport {
                    status: Some(500),
                    message: "HTTP 500: internal error".into(),
                });
            }
            Ok(serde_json::json!({"success": true, "asset": {"id": req.upload_id}}))
        })
    }

    fn abort_upload<'a>(&'a self, req: &'a AbortUploadRequest) -> TransportFuture<'a, ()> {
        self.record(Call::Abort {
            upload_id: req.upload_id.clone(),
            key: req.key.clone(),
        });
        let fail = self.fail_abort;
        Box::pin(async move {
            if fail {
                return Err(UploadError::Transport {
                    status: Some(503),
                    message: "HTTP 503: unavailable".into(),
                });
            }
            Ok(())
        })
    }
}
