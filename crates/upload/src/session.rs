//! Single-file upload session.
//!
//! A session drives one file through create, parts and complete. Any failure
//! after the remote upload exists triggers exactly one abort call, whose own
//! outcome is recorded but never replaces the error that ended the session.

use assetmgr_protocol::messages::{
    AbortUploadRequest, CompleteUploadRequest, CreateUploadRequest, PartResult,
};
use assetmgr_transfer::ChunkReader;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::transport::UploadTransport;
use crate::types::{AbortOutcome, AssetFile, UploadEvent, UploadSettings, UploadTarget};

/// Lifecycle of a session.
///
/// `Succeeded` and `Failed` are terminal. Every non-terminal state may move
/// to `Aborting`; a failed create goes straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Initiating,
    Uploading,
    Completing,
    Aborting,
    Succeeded,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Succeeded | SessionState::Failed)
    }

    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Created, Initiating)
                | (Initiating, Uploading)
                | (Uploading, Completing)
                | (Completing, Succeeded)
                | (Created | Initiating | Uploading | Completing, Aborting)
                | (Initiating | Aborting, Failed)
        )
    }
}

/// Final record of a session.
#[derive(Debug)]
pub struct SessionReport {
    pub asset: AssetFile,
    pub state: SessionState,
    pub upload_id: Option<String>,
    pub storage_key: Option<String>,
    /// Parts accepted by the server, ascending from 1.
    pub parts: Vec<PartResult>,
    /// Server completion document, or the error that ended the session.
    pub result: Result<serde_json::Value, UploadError>,
    pub abort: AbortOutcome,
}

impl SessionReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Uploads one file through the multipart protocol.
pub struct UploadSession<'a> {
    transport: &'a dyn UploadTransport,
    settings: &'a UploadSettings,
    target: &'a UploadTarget,
    asset: AssetFile,
    state: SessionState,
    upload_id: Option<String>,
    storage_key: Option<String>,
    parts: Vec<PartResult>,
    events: Option<(mpsc::Sender<UploadEvent>, String)>,
}

impl<'a> UploadSession<'a> {
    pub fn new(
        transport: &'a dyn UploadTransport,
        settings: &'a UploadSettings,
        target: &'a UploadTarget,
        asset: AssetFile,
    ) -> Self {
        Self {
            transport,
            settings,
            target,
            asset,
            state: SessionState::Created,
            upload_id: None,
            storage_key: None,
            parts: Vec::new(),
            events: None,
        }
    }

    /// Reports part progress on `events`, labelled with `file`.
    pub fn with_events(mut self, events: mpsc::Sender<UploadEvent>, file: impl Into<String>) -> Self {
        self.events = Some((events, file.into()));
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to a terminal state.
    pub async fn run(mut self) -> SessionReport {
        let result = self.drive().await;

        let abort = match &result {
            Ok(_) => {
                self.transition(SessionState::Succeeded);
                info!(
                    file = %self.asset.filename,
                    parts = self.parts.len(),
                    "upload complete"
                );
                AbortOutcome::NotNeeded
            }
            Err(e) => {
                warn!(file = %self.asset.filename, error = %e, "upload failed");
                let outcome = if self.upload_id.is_some() && self.storage_key.is_some() {
                    self.transition(SessionState::Aborting);
                    self.compensate().await
                } else {
                    AbortOutcome::NotNeeded
                };
                self.transition(SessionState::Failed);
                outcome
            }
        };

        SessionReport {
            asset: self.asset,
            state: self.state,
            upload_id: self.upload_id,
            storage_key: self.storage_key,
            parts: self.parts,
            result,
            abort,
        }
    }

    async fn drive(&mut self) -> Result<serde_json::Value, UploadError> {
        self.transition(SessionState::Initiating);
        let created = self.transport.create_upload(&self.create_request()).await?;
        if created.upload_id.is_empty() || created.key.is_empty() {
            return Err(UploadError::Application(
                "create response is missing uploadId or key".into(),
            ));
        }
        self.upload_id = Some(created.upload_id.clone());
        self.storage_key = Some(created.key.clone());
        debug!(file = %self.asset.filename, upload_id = %created.upload_id, "upload created");

        self.transition(SessionState::Uploading);
        self.upload_parts(&created.upload_id, &created.key).await?;

        self.transition(SessionState::Completing);
        let req = self.complete_request(created.upload_id, created.key);
        self.transport.complete_upload(&req).await
    }

    async fn upload_parts(&mut self, upload_id: &str, key: &str) -> Result<(), UploadError> {
        let path = self.asset.path.clone();
        let chunk_size = self.settings.chunk_size;
        let mut reader = tokio::task::spawn_blocking(move || ChunkReader::new(&path, chunk_size))
            .await
            .map_err(std::io::Error::other)??;
        if reader.file_size() != self.asset.size {
            return Err(UploadError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "{} changed size since it was inspected: {} bytes declared, {} found",
                    self.asset.filename,
                    self.asset.size,
                    reader.file_size()
                ),
            )));
        }

        loop {
            let (returned, next) = tokio::task::spawn_blocking(move || {
                let chunk = reader.next_chunk();
                (reader, chunk)
            })
            .await
            .map_err(std::io::Error::other)?;
            reader = returned;

            let Some(chunk) = next? else {
                break;
            };

            let part_number = chunk.part_number;
            let bytes = chunk.len();
            let part = self
                .transport
                .upload_part(upload_id, key, part_number, chunk.data)
                .await?;
            if part.part_number != part_number {
                return Err(UploadError::Application(format!(
                    "server acknowledged part {} for part {part_number}",
                    part.part_number
                )));
            }

            debug!(upload_id = %upload_id, part_number, bytes, "part uploaded");
            self.parts.push(part);
            self.emit(|file| UploadEvent::PartUploaded {
                file,
                part_number,
                bytes,
            });
        }

        Ok(())
    }

    /// Aborts the remote upload if one was created.
    async fn compensate(&mut self) -> AbortOutcome {
        let (Some(upload_id), Some(key)) = (self.upload_id.clone(), self.storage_key.clone())
        else {
            return AbortOutcome::NotNeeded;
        };

        let req = AbortUploadRequest { upload_id, key };
        match self.transport.abort_upload(&req).await {
            Ok(()) => {
                debug!(upload_id = %req.upload_id, "upload aborted");
                AbortOutcome::Aborted
            }
            Err(e) => {
                warn!(upload_id = %req.upload_id, error = %e, "abort failed");
                AbortOutcome::Failed(e.to_string())
            }
        }
    }

    fn create_request(&self) -> CreateUploadRequest {
        CreateUploadRequest {
            organization_id: self.target.organization_id().map(str::to_string),
            project_id: self.target.project_id().to_string(),
            platform: self.settings.platform.clone(),
            file_name: self.asset.filename.clone(),
            file_size: self.asset.size,
            content_type: self.asset.content_type.to_string(),
            kind: self.asset.kind,
            title: self.asset.filename.clone(),
            folder_id: self.target.folder_id().to_string(),
            metadata: self.target.metadata().cloned(),
        }
    }

    fn complete_request(&self, upload_id: String, key: String) -> CompleteUploadRequest {
        CompleteUploadRequest {
            upload_id,
            key,
            parts: self.parts.clone(),
            kind: self.asset.kind,
            title: self.asset.filename.clone(),
            folder_id: self.target.folder_id().to_string(),
            organization_id: self.target.organization_id().map(str::to_string),
            project_id: self.target.project_id().to_string(),
            platform: self.settings.platform.clone(),
            metadata: self
                .target
                .metadata()
                .cloned()
                .unwrap_or_else(|| serde_json::json!({})),
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid session transition {:?} -> {next:?}",
            self.state
        );
        debug!(file = %self.asset.filename, from = ?self.state, to = ?next, "session state");
        self.state = next;
    }

    fn emit(&self, event: impl FnOnce(String) -> UploadEvent) {
        if let Some((tx, file)) = &self.events {
            let _ = tx.try_send(event(file.clone()));
        }
    }
}

/// Inspects `path` and uploads it in one session.
pub async fn upload_file(
    transport: &dyn UploadTransport,
    settings: &UploadSettings,
    target: &UploadTarget,
    path: &std::path::Path,
) -> Result<SessionReport, UploadError> {
    let asset =
        AssetFile::inspect_blocking(path.to_path_buf(), settings.file_types.clone()).await?;
    Ok(UploadSession::new(transport, settings, target, asset).run().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mock::{Call, MockTransport};
    use tempfile::TempDir;

    const MIB: usize = 1024 * 1024;

    fn write_file(dir: &TempDir, name: &str, len: usize) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![0xA5u8; len]).unwrap();
        path
    }

    fn small_settings(chunk_size: usize) -> UploadSettings {
        UploadSettings {
            chunk_size,
            ..UploadSettings::default()
        }
    }

    #[tokio::test]
    async fn large_file_uploads_in_three_parts() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "render.mp4", 25 * MIB);
        let mock = MockTransport::new();
        let settings = UploadSettings::default();
        let target = UploadTarget::new("p1").unwrap();

        let report = upload_file(&mock, &settings, &target, &path).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.state, SessionState::Succeeded);
        assert_eq!(report.abort, AbortOutcome::NotNeeded);
        assert_eq!(mock.part_sizes(), vec![10 * MIB, 10 * MIB, 5 * MIB]);
        let calls = mock.calls();
        assert_eq!(
            calls.last().unwrap(),
            &Call::Complete {
                upload_id: "up-render.mp4".into(),
                parts: vec![1, 2, 3],
            }
        );
        assert_eq!(mock.count(|c| matches!(c, Call::Abort { .. })), 0);
    }

    #[tokio::test]
    async fn create_request_carries_target_and_type() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "mesh.glb", 10);
        let mock = MockTransport::new();
        let settings = small_settings(4);
        let target = UploadTarget::new("p1")
            .unwrap()
            .with_folder(Some("f2".into()))
            .with_organization(Some("o3".into()))
            .with_metadata(Some(serde_json::json!({"seed": 7})));

        upload_file(&mock, &settings, &target, &path).await.unwrap();

        let create = mock.last_create().unwrap();
        assert_eq!(create.file_name, "mesh.glb");
        assert_eq!(create.file_size, 10);
        assert_eq!(create.content_type, "model/gltf-binary");
        assert_eq!(create.folder_id, "f2");
        assert_eq!(create.organization_id.as_deref(), Some("o3"));
        assert_eq!(create.platform, "comfyui");
        assert_eq!(create.metadata, Some(serde_json::json!({"seed": 7})));

        let complete = mock.last_complete().unwrap();
        assert_eq!(complete.metadata, serde_json::json!({"seed": 7}));
        assert_eq!(complete.key, "assets/mesh.glb");
    }

    #[tokio::test]
    async fn complete_without_metadata_sends_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.png", 3);
        let mock = MockTransport::new();
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();

        upload_file(&mock, &settings, &target, &path).await.unwrap();

        let complete = mock.last_complete().unwrap();
        assert_eq!(complete.metadata, serde_json::json!({}));
        assert_eq!(complete.folder_id, "p1");
    }

    #[tokio::test]
    async fn part_failure_aborts_once_and_skips_complete() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "clip.mov", 10);
        let mock = MockTransport::new().fail_part(2);
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();

        let report = upload_file(&mock, &settings, &target, &path).await.unwrap();

        assert_eq!(report.state, SessionState::Failed);
        assert_eq!(report.abort, AbortOutcome::Aborted);
        let err = report.result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("timed out"));
        assert_eq!(report.parts.len(), 1);

        assert_eq!(mock.count(|c| matches!(c, Call::Complete { .. })), 0);
        assert_eq!(
            mock.calls()
                .into_iter()
                .filter(|c| matches!(c, Call::Abort { .. }))
                .collect::<Vec<_>>(),
            vec![Call::Abort {
                upload_id: "up-clip.mov".into(),
                key: "assets/clip.mov".into(),
            }]
        );
    }

    #[tokio::test]
    async fn create_failure_does_not_abort() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.png", 3);
        let mock = MockTransport::new().fail_create();
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();

        let report = upload_file(&mock, &settings, &target, &path).await.unwrap();

        assert_eq!(report.state, SessionState::Failed);
        assert_eq!(report.abort, AbortOutcome::NotNeeded);
        assert!(report.upload_id.is_none());
        assert_eq!(report.result.unwrap_err().kind(), ErrorKind::Application);
        assert_eq!(mock.count(|c| matches!(c, Call::Abort { .. })), 0);
        assert_eq!(mock.count(|c| matches!(c, Call::Part { .. })), 0);
    }

    #[tokio::test]
    async fn complete_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.wav", 9);
        let mock = MockTransport::new().fail_complete();
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();

        let report = upload_file(&mock, &settings, &target, &path).await.unwrap();

        assert_eq!(report.state, SessionState::Failed);
        assert_eq!(report.abort, AbortOutcome::Aborted);
        assert_eq!(report.parts.len(), 3);
        assert_eq!(mock.count(|c| matches!(c, Call::Abort { .. })), 1);
    }

    #[tokio::test]
    async fn abort_failure_keeps_original_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.png", 10);
        let mock = MockTransport::new().fail_part(1).fail_abort();
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();

        let report = upload_file(&mock, &settings, &target, &path).await.unwrap();

        assert!(matches!(report.abort, AbortOutcome::Failed(_)));
        let err = report.result.unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
        assert_eq!(mock.count(|c| matches!(c, Call::Abort { .. })), 1);
    }

    #[tokio::test]
    async fn zero_byte_file_completes_with_no_parts() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.txt", 0);
        let mock = MockTransport::new();
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();

        let report = upload_file(&mock, &settings, &target, &path).await.unwrap();

        assert!(report.is_success());
        assert!(report.parts.is_empty());
        assert_eq!(mock.count(|c| matches!(c, Call::Part { .. })), 0);
        assert_eq!(mock.last_complete().unwrap().parts, vec![]);
    }

    #[tokio::test]
    async fn file_removed_before_reading_aborts() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "gone.png", 8);
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();
        let asset = AssetFile::inspect(&path, &settings.file_types).unwrap();
        std::fs::remove_file(&path).unwrap();

        let mock = MockTransport::new();
        let report = UploadSession::new(&mock, &settings, &target, asset).run().await;

        assert_eq!(report.result.unwrap_err().kind(), ErrorKind::Io);
        assert_eq!(report.abort, AbortOutcome::Aborted);
        assert_eq!(mock.count(|c| matches!(c, Call::Complete { .. })), 0);
    }

    #[tokio::test]
    async fn file_grown_after_inspection_aborts_without_parts() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "grow.png", 8);
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();
        let asset = AssetFile::inspect(&path, &settings.file_types).unwrap();
        std::fs::write(&path, vec![1u8; 12]).unwrap();

        let mock = MockTransport::new();
        let report = UploadSession::new(&mock, &settings, &target, asset).run().await;

        let err = report.result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("changed size"), "{err}");
        assert_eq!(report.abort, AbortOutcome::Aborted);
        assert_eq!(mock.count(|c| matches!(c, Call::Part { .. })), 0);
        assert_eq!(mock.count(|c| matches!(c, Call::Abort { .. })), 1);
        assert_eq!(mock.count(|c| matches!(c, Call::Complete { .. })), 0);
    }

    #[tokio::test]
    async fn missing_file_fails_before_any_call() {
        let dir = TempDir::new().unwrap();
        let mock = MockTransport::new();
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();

        let err = upload_file(&mock, &settings, &target, &dir.path().join("nope.png"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn emits_part_events() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.png", 6);
        let mock = MockTransport::new();
        let settings = small_settings(4);
        let target = UploadTarget::new("p1").unwrap();
        let asset = AssetFile::inspect(&path, &settings.file_types).unwrap();
        let (tx, mut rx) = mpsc::channel(8);

        UploadSession::new(&mock, &settings, &target, asset)
            .with_events(tx, "a.png")
            .run()
            .await;

        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        assert_eq!(
            events,
            vec![
                UploadEvent::PartUploaded { file: "a.png".into(), part_number: 1, bytes: 4 },
                UploadEvent::PartUploaded { file: "a.png".into(), part_number: 2, bytes: 2 },
            ]
        );
    }

    #[test]
    fn state_transitions() {
        use SessionState::*;
        assert!(Created.can_transition_to(Initiating));
        assert!(Uploading.can_transition_to(Aborting));
        assert!(Aborting.can_transition_to(Failed));
        assert!(Initiating.can_transition_to(Failed));
        assert!(!Uploading.can_transition_to(Failed));
        assert!(!Succeeded.can_transition_to(Aborting));
        assert!(!Uploading.can_transition_to(Succeeded));
        assert!(Failed.is_terminal() && Succeeded.is_terminal());
        assert!(!Completing.is_terminal());
    }
}
