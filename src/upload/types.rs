//! Upload types for the chunked upload protocol

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default chunk size when the server does not supply one: 512 KiB
pub const DEFAULT_CHUNK_SIZE_BYTES: u64 = 512 * 1024;

/// Maximum file size: 50 MiB
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// The only extension accepted by default
pub const DEFAULT_ALLOWED_EXTENSION: &str = "mp4";

const FALLBACK_MIME: &str = "application/octet-stream";

// ============================================================================
// Identifiers
// ============================================================================

/// Server-side project identifier. Zero is a valid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for ProjectId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ============================================================================
// File
// ============================================================================

/// A file to upload, held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadableFile {
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

impl UploadableFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MIME)
            .to_string();

        Ok(Self::new(name, mime_type, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Advisory MIME type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Lower-cased text after the last `.` of the name; empty without a dot
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }

    /// Entire contents
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes in `range`, or `None` if it reaches past the end of the file
    pub(crate) fn slice(&self, range: Range<u64>) -> Option<&[u8]> {
        let start = usize::try_from(range.start).ok()?;
        let end = usize::try_from(range.end).ok()?;
        self.data.get(start..end)
    }
}

// ============================================================================
// Constraints
// ============================================================================

/// Client-side checks applied before an upload starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConstraints {
    /// Lower-case extensions without the dot
    pub allowed_extensions: BTreeSet<String>,

    /// Largest accepted file, in bytes
    pub max_size_bytes: u64,

    /// Chunk size used when the server does not supply one
    pub default_chunk_size_bytes: u64,
}

impl Default for UploadConstraints {
    fn default() -> Self {
        Self {
            allowed_extensions: BTreeSet::from([DEFAULT_ALLOWED_EXTENSION.to_string()]),
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            default_chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
        }
    }
}

impl UploadConstraints {
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(extension)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Client-side view of one server upload session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    /// Server-assigned opaque id
    pub upload_id: String,

    /// Fixed for the lifetime of the session, always positive
    pub chunk_size_bytes: u64,

    /// Bytes accepted by the server so far
    pub bytes_sent: u64,

    /// Index of the next chunk to send
    pub next_chunk_index: u64,
}

impl UploadSession {
    pub fn new(upload_id: String, chunk_size_bytes: u64) -> Self {
        Self {
            upload_id,
            chunk_size_bytes,
            bytes_sent: 0,
            next_chunk_index: 0,
        }
    }

    /// Byte range of the next chunk, or `None` once `total` bytes are sent
    pub fn next_range(&self, total: u64) -> Option<Range<u64>> {
        if self.bytes_sent >= total {
            return None;
        }
        let end = total.min(self.bytes_sent.saturating_add(self.chunk_size_bytes));
        Some(self.bytes_sent..end)
    }

    /// Record a chunk of `len` bytes as accepted
    pub fn accept(&mut self, len: u64) {
        self.bytes_sent += len;
        self.next_chunk_index += 1;
    }

    /// Number of chunks needed for `total` bytes
    pub fn chunk_count(&self, total: u64) -> u64 {
        total.div_ceil(self.chunk_size_bytes)
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// Body of the init exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitRequest {
    pub filename: String,
    pub size: u64,
    pub mime: String,
}

impl InitRequest {
    pub fn for_file(file: &UploadableFile) -> Self {
        Self {
            filename: file.name().to_string(),
            size: file.size(),
            mime: file.mime_type().to_string(),
        }
    }
}

/// Response to the init exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    #[serde(default)]
    pub upload_id: Option<String>,

    #[serde(default)]
    pub chunk_size: Option<u64>,
}

/// One chunk handed to the transport
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub index: u64,
    pub data: &'a [u8],
    /// Name of the source file
    pub file_name: &'a str,
}

impl Chunk<'_> {
    /// File name of the multipart part, suffixed with the chunk index
    pub fn part_file_name(&self) -> String {
        format!("{}.part{}", self.file_name, self.index)
    }
}

/// Asset created by a completed upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<u64>,

    /// Storage path or URL of the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Input rejected before any network activity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Project id is required")]
    MissingProject,

    #[error("File is required")]
    MissingFile,

    #[error("File extension {extension:?} is not allowed (allowed: {allowed:?})")]
    ExtensionNotAllowed {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },
}

/// The session could not be established
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Init exchange failed: {0}")]
    Init(#[source] ApiError),

    #[error("Server did not return an upload id")]
    MissingUploadId,

    /// A transfer step ran before init established a session
    #[error("No upload session has been established")]
    NotEstablished,

    /// The driver already reached `Done` or `Failed`
    #[error("Upload has already finished")]
    Finished,
}

/// A chunk or the completion exchange failed
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Chunk {index} failed: {source}")]
    Chunk {
        index: u64,
        #[source]
        source: ApiError,
    },

    #[error("Complete exchange failed: {0}")]
    Complete(#[source] ApiError),

    /// The single-request upload was rejected
    #[error("Upload request failed: {0}")]
    Upload(#[source] ApiError),
}

/// Terminal failure of an upload attempt. Never retried internally.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadableFile {
        UploadableFile::new(name, "video/mp4", vec![0; 4])
    }

    #[test]
    fn test_extension() {
        assert_eq!(file("clip.mp4").extension(), "mp4");
        assert_eq!(file("CLIP.Final.MP4").extension(), "mp4");
        assert_eq!(file("noext").extension(), "");
        assert_eq!(file("trailing.").extension(), "");
        assert_eq!(file(".mp4").extension(), "mp4");
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Intro.MP4");
        std::fs::write(&path, b"0123456789").unwrap();

        let file = UploadableFile::from_path(&path).await.unwrap();

        assert_eq!(file.name(), "Intro.MP4");
        assert_eq!(file.size(), 10);
        assert_eq!(file.mime_type(), "video/mp4");
        assert_eq!(file.extension(), "mp4");
        assert_eq!(file.slice(2..5), Some(&b"234"[..]));
        assert_eq!(file.bytes(), b"0123456789");
    }

    #[tokio::test]
    async fn test_from_path_unknown_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("raw.zzqx");
        std::fs::write(&path, b"").unwrap();

        let file = UploadableFile::from_path(&path).await.unwrap();
        assert_eq!(file.mime_type(), "application/octet-stream");
        assert_eq!(file.size(), 0);
    }

    #[test]
    fn test_slice_out_of_range() {
        let file = file("clip.mp4");
        assert_eq!(file.slice(0..4), Some(&[0u8; 4][..]));
        assert_eq!(file.slice(4..4), Some(&[][..]));
        assert_eq!(file.slice(2..5), None);
        assert_eq!(file.slice(9..12), None);
    }

    #[test]
    fn test_session_ranges() {
        let mut session = UploadSession::new("u".to_string(), 4);
        assert_eq!(session.chunk_count(10), 3);

        assert_eq!(session.next_range(10), Some(0..4));
        session.accept(4);
        assert_eq!(session.next_range(10), Some(4..8));
        session.accept(4);
        assert_eq!(session.next_range(10), Some(8..10));
        session.accept(2);
        assert_eq!(session.next_range(10), None);
        assert_eq!(session.next_chunk_index, 3);
        assert_eq!(session.bytes_sent, 10);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_chunk() {
        let mut session = UploadSession::new("u".to_string(), 5);
        assert_eq!(session.chunk_count(10), 2);
        session.accept(5);
        session.accept(5);
        assert_eq!(session.next_range(10), None);
    }

    #[test]
    fn test_init_response_tolerates_missing_fields() {
        let parsed: InitResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, InitResponse::default());

        let parsed: InitResponse =
            serde_json::from_str(r#"{"upload_id": "abc", "chunk_size": 1024, "extra": 1}"#).unwrap();
        assert_eq!(parsed.upload_id.as_deref(), Some("abc"));
        assert_eq!(parsed.chunk_size, Some(1024));
    }

    #[test]
    fn test_asset_keeps_unknown_fields() {
        let asset: Asset = serde_json::from_str(
            r#"{"id": 7, "original_name": "clip.mp4", "size": 10, "duration": 3.5}"#,
        )
        .unwrap();

        assert_eq!(asset.id, 7);
        assert_eq!(asset.original_name.as_deref(), Some("clip.mp4"));
        assert_eq!(asset.extra["duration"], 3.5);
    }

    #[test]
    fn test_part_file_name() {
        let chunk = Chunk {
            index: 2,
            data: b"abc",
            file_name: "clip.mp4",
        };
        assert_eq!(chunk.part_file_name(), "clip.mp4.part2");
    }
}
