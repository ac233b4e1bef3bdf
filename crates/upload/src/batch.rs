//! Batch orchestration.
//!
//! Runs one [`UploadSession`] per file and folds the outcomes into a
//! [`BatchResult`]. Files fail independently; the batch never stops early.

use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::UploadError;
use crate::session::UploadSession;
use crate::transport::UploadTransport;
use crate::types::{AssetFile, BatchItem, BatchResult, UploadEvent, UploadSettings, UploadTarget};

/// Uploads a list of files to one target.
pub struct BatchCoordinator<'a> {
    transport: &'a dyn UploadTransport,
    settings: &'a UploadSettings,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(transport: &'a dyn UploadTransport, settings: &'a UploadSettings) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            transport,
            settings,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Events are dropped rather than awaited when the channel is full.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Uploads every file and returns the aggregated result.
    ///
    /// Up to `max_concurrent_sessions` sessions run at once. Under
    /// concurrency the error list follows completion order, not input order.
    pub async fn run(&self, items: Vec<BatchItem>, target: &UploadTarget) -> BatchResult {
        let mut result = BatchResult::new(items.len());
        let limit = self.settings.max_concurrent_sessions.max(1);
        info!(
            files = items.len(),
            project = %target.project_id(),
            folder = %target.folder_id(),
            concurrency = limit,
            "batch started"
        );

        // The stream consumer is the only writer of `result`.
        let mut outcomes = stream::iter(items)
            .map(|item| self.upload_one(item, target))
            .buffer_unordered(limit);
        while let Some((reference, outcome)) = outcomes.next().await {
            match outcome {
                Ok(()) => result.record_success(),
                Err(message) => result.record_failure(reference, message),
            }
        }

        result.finalize();
        info!(
            successful = result.successful,
            failed = result.failed,
            status = ?result.status,
            "batch finished"
        );
        self.emit(UploadEvent::BatchFinished(result.clone()));
        result
    }

    async fn upload_one(&self, item: BatchItem, target: &UploadTarget) -> (String, Result<(), String>) {
        let BatchItem { reference, path } = item;
        self.emit(UploadEvent::FileStarted {
            file: reference.clone(),
        });

        let inspected = AssetFile::inspect_blocking(path, self.settings.file_types.clone()).await;
        let outcome = match inspected {
            Ok(asset) => {
                UploadSession::new(self.transport, self.settings, target, asset)
                    .with_events(self.events_tx.clone(), reference.clone())
                    .run()
                    .await
                    .result
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(_) => {
                self.emit(UploadEvent::FileSucceeded {
                    file: reference.clone(),
                });
                (reference, Ok(()))
            }
            Err(e) => {
                let message = failure_message(&e);
                warn!(file = %reference, error = %e, "file not uploaded");
                self.emit(UploadEvent::FileFailed {
                    file: reference.clone(),
                    error: message.clone(),
                });
                (reference, Err(message))
            }
        }
    }

    fn emit(&self, event: UploadEvent) {
        let _ = self.events_tx.try_send(event);
    }
}

/// Error text recorded for a failed file.
fn failure_message(err: &UploadError) -> String {
    match err {
        UploadError::NotFound(_) => err.to_string(),
        other => format!("Upload failed: {other}"),
    }
}
