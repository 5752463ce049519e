//! Upload Driver
//!
//! Drives one chunked upload as an explicit state machine:
//!
//! ```text
//! Idle → Initializing → TransferringChunk(0) → … → TransferringChunk(k-1) → Completing → Done
//!              │                  │                                              │
//!              └──────────────────┴──────────────────► Failed ◄─────────────────┘
//! ```
//!
//! Each exchange is awaited before the next begins. Nothing is retried and a
//! failed session is abandoned as-is.

use super::progress::{ProgressObserver, ProgressReporter};
use super::protocol::UploadTransport;
use super::types::{
    Asset, Chunk, InitRequest, ProjectId, SessionError, TransferError, UploadConstraints,
    UploadError, UploadSession, UploadableFile, ValidationError,
};

/// Position of an upload in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Initializing,
    /// Next chunk to send
    TransferringChunk(u64),
    Completing,
    Done,
    Failed,
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Check upload inputs. Performs no I/O.
pub fn validate<'f>(
    project: Option<ProjectId>,
    file: Option<&'f UploadableFile>,
    constraints: &UploadConstraints,
) -> Result<(ProjectId, &'f UploadableFile), ValidationError> {
    let project = project.ok_or(ValidationError::MissingProject)?;
    let file = file.ok_or(ValidationError::MissingFile)?;

    let extension = file.extension();
    if !constraints.allows_extension(&extension) {
        return Err(ValidationError::ExtensionNotAllowed {
            extension,
            allowed: constraints.allowed_extensions.iter().cloned().collect(),
        });
    }

    if file.size() > constraints.max_size_bytes {
        return Err(ValidationError::FileTooLarge {
            size: file.size(),
            max: constraints.max_size_bytes,
        });
    }

    Ok((project, file))
}

/// Validate, then run a complete upload
pub async fn upload<T>(
    transport: &T,
    project: Option<ProjectId>,
    file: Option<&UploadableFile>,
    constraints: &UploadConstraints,
    on_progress: Option<&dyn ProgressObserver>,
) -> Result<Asset, UploadError>
where
    T: UploadTransport + ?Sized,
{
    let (project, file) = validate(project, file, constraints)?;

    UploadDriver::new(transport, project, file, constraints, on_progress)
        .run()
        .await
}

/// State machine for a single upload.
///
/// Owns the session counters exclusively; separate drivers share nothing.
pub struct UploadDriver<'a, T: UploadTransport + ?Sized> {
    transport: &'a T,
    project: ProjectId,
    file: &'a UploadableFile,
    default_chunk_size: u64,
    progress: ProgressReporter<'a>,
    state: UploadState,
    session: Option<UploadSession>,
}

impl<'a, T: UploadTransport + ?Sized> UploadDriver<'a, T> {
    /// Build a driver for already validated inputs
    pub fn new(
        transport: &'a T,
        project: ProjectId,
        file: &'a UploadableFile,
        constraints: &UploadConstraints,
        on_progress: Option<&'a dyn ProgressObserver>,
    ) -> Self {
        Self {
            transport,
            project,
            file,
            default_chunk_size: constraints.default_chunk_size_bytes.max(1),
            progress: ProgressReporter::new(on_progress),
            state: UploadState::Idle,
            session: None,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Session established by the init exchange, if any
    pub fn session(&self) -> Option<&UploadSession> {
        self.session.as_ref()
    }

    /// Step until the upload is done or fails.
    ///
    /// A driver that has already finished yields `SessionError::Finished`.
    pub async fn run(mut self) -> Result<Asset, UploadError> {
        loop {
            if self.state.is_terminal() {
                return Err(SessionError::Finished.into());
            }
            if let Some(asset) = self.step().await? {
                return Ok(asset);
            }
        }
    }

    /// Perform one transition.
    ///
    /// Returns the asset on the transition into `Done`. Stepping a driver in
    /// a terminal state does nothing.
    pub async fn step(&mut self) -> Result<Option<Asset>, UploadError> {
        let result = match self.state {
            UploadState::Idle => {
                self.progress.report(0.0);
                self.state = UploadState::Initializing;
                Ok(None)
            }
            UploadState::Initializing => self.initialize().await.map(|_| None),
            UploadState::TransferringChunk(index) => self.transfer_chunk(index).await.map(|_| None),
            UploadState::Completing => self.finish().await.map(Some),
            UploadState::Done | UploadState::Failed => {
                tracing::debug!(state = ?self.state, "Upload already finished");
                Ok(None)
            }
        };

        if let Err(err) = &result {
            tracing::warn!(
                project = %self.project,
                file_name = %self.file.name(),
                upload_id = self.session.as_ref().map(|s| s.upload_id.as_str()),
                error = %err,
                "Upload failed"
            );
            self.state = UploadState::Failed;
        }

        result
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    async fn initialize(&mut self) -> Result<(), UploadError> {
        let request = InitRequest::for_file(self.file);

        let response = self
            .transport
            .init(self.project, &request)
            .await
            .map_err(SessionError::Init)?;

        let upload_id = response
            .upload_id
            .filter(|id| !id.is_empty())
            .ok_or(SessionError::MissingUploadId)?;

        let chunk_size = match response.chunk_size {
            Some(size) if size > 0 => size,
            Some(_) => {
                tracing::warn!(upload_id = %upload_id, "Server sent a zero chunk size; using default");
                self.default_chunk_size
            }
            None => self.default_chunk_size,
        };

        let session = UploadSession::new(upload_id, chunk_size);

        tracing::info!(
            project = %self.project,
            upload_id = %session.upload_id,
            file_name = %self.file.name(),
            file_size = self.file.size(),
            chunk_size = chunk_size,
            chunks = session.chunk_count(self.file.size()),
            "Created upload session"
        );

        // A zero-byte file has no chunks and completes immediately
        self.state = if self.file.size() == 0 {
            UploadState::Completing
        } else {
            UploadState::TransferringChunk(session.next_chunk_index)
        };
        self.session = Some(session);

        Ok(())
    }

    async fn transfer_chunk(&mut self, index: u64) -> Result<(), UploadError> {
        let total = self.file.size();
        let session = self
            .session
            .as_mut()
            .ok_or(SessionError::NotEstablished)?;

        debug_assert_eq!(index, session.next_chunk_index);

        let Some(range) = session.next_range(total) else {
            self.state = UploadState::Completing;
            return Ok(());
        };

        // next_range never reaches past `total`
        let data = self.file.slice(range.clone()).unwrap_or_default();
        let chunk = Chunk {
            index,
            data,
            file_name: self.file.name(),
        };

        self.transport
            .put_chunk(self.project, &session.upload_id, chunk)
            .await
            .map_err(|source| TransferError::Chunk { index, source })?;

        session.accept(range.end - range.start);

        tracing::debug!(
            upload_id = %session.upload_id,
            chunk_index = index,
            bytes_sent = session.bytes_sent,
            total = total,
            "Chunk uploaded"
        );

        self.state = if session.bytes_sent == total {
            UploadState::Completing
        } else {
            UploadState::TransferringChunk(session.next_chunk_index)
        };

        let fraction = (session.bytes_sent as f64 / total as f64).min(1.0);
        self.progress.report(fraction);

        Ok(())
    }

    async fn finish(&mut self) -> Result<Asset, UploadError> {
        let session = self
            .session
            .as_ref()
            .ok_or(SessionError::NotEstablished)?;

        let asset = self
            .transport
            .complete(self.project, &session.upload_id)
            .await
            .map_err(TransferError::Complete)?;

        tracing::info!(
            upload_id = %session.upload_id,
            asset_id = asset.id,
            size = session.bytes_sent,
            "Upload completed"
        );

        self.state = UploadState::Done;
        self.progress.report(1.0);

        Ok(asset)
    }
}

// ============================================================================
// Tests
// ============================================================================
