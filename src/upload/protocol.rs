//! Chunked upload exchanges
//!
//! Three exchanges per session, always in this order:
//! 1. `init` once, yielding the upload id and optionally the chunk size
//! 2. `put_chunk` once per chunk, indices `0, 1, 2, …`
//! 3. `complete` once, yielding the created asset

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::types::{Asset, Chunk, InitRequest, InitResponse, ProjectId};
use crate::error::ApiError;
use crate::http::ApiClient;

/// Transport for the chunked upload exchanges
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Open a session for a file in `project`
    async fn init(&self, project: ProjectId, request: &InitRequest) -> Result<InitResponse, ApiError>;

    /// Send one chunk; any success status means accepted
    async fn put_chunk(
        &self,
        project: ProjectId,
        upload_id: &str,
        chunk: Chunk<'_>,
    ) -> Result<(), ApiError>;

    /// Finish the session and return the created asset
    async fn complete(&self, project: ProjectId, upload_id: &str) -> Result<Asset, ApiError>;
}

/// `/api/projects/{project}/assets/chunked/init/`
pub fn init_path(project: ProjectId) -> String {
    format!("/api/projects/{}/assets/chunked/init/", project)
}

/// `/api/projects/{project}/assets/chunked/{upload_id}/`
pub fn chunk_path(project: ProjectId, upload_id: &str) -> String {
    format!(
        "/api/projects/{}/assets/chunked/{}/",
        project,
        urlencoding::encode(upload_id)
    )
}

/// `/api/projects/{project}/assets/chunked/{upload_id}/complete/`
pub fn complete_path(project: ProjectId, upload_id: &str) -> String {
    format!(
        "/api/projects/{}/assets/chunked/{}/complete/",
        project,
        urlencoding::encode(upload_id)
    )
}

#[async_trait]
impl UploadTransport for ApiClient {
    async fn init(&self, project: ProjectId, request: &InitRequest) -> Result<InitResponse, ApiError> {
        self.post_json(&init_path(project), request).await
    }

    async fn put_chunk(
        &self,
        project: ProjectId,
        upload_id: &str,
        chunk: Chunk<'_>,
    ) -> Result<(), ApiError> {
        let part = Part::bytes(chunk.data.to_vec())
            .file_name(chunk.part_file_name())
            .mime_str("application/octet-stream")?;

        let form = Form::new()
            .part("chunk", part)
            .text("index", chunk.index.to_string());

        self.post_multipart(&chunk_path(project, upload_id), form).await
    }

    async fn complete(&self, project: ProjectId, upload_id: &str) -> Result<Asset, ApiError> {
        self.post_empty(&complete_path(project, upload_id)).await
    }
}
