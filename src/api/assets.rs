//! Asset endpoints

use reqwest::multipart::{Form, Part};

use crate::error::Result;
use crate::http::ApiClient;
use crate::upload::{
    validate, Asset, ProjectId, TransferError, UploadConstraints, UploadError, UploadableFile,
};

impl ApiClient {
    /// GET /api/projects/{id}/assets/
    pub async fn list_assets(&self, project: ProjectId) -> Result<Vec<Asset>> {
        self.get(&format!("/api/projects/{}/assets/", project)).await
    }

    /// POST /api/projects/{id}/assets/
    ///
    /// Sends the whole file as the multipart `file` part in one request.
    /// Applies the same checks as the chunked upload first.
    pub async fn upload_asset(
        &self,
        project: ProjectId,
        file: &UploadableFile,
        constraints: &UploadConstraints,
    ) -> std::result::Result<Asset, UploadError> {
        let (project, file) = validate(Some(project), Some(file), constraints)?;

        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| TransferError::Upload(e.into()))?;
        let form = Form::new().part("file", part);

        let asset: Asset = self
            .post_form(&format!("/api/projects/{}/assets/", project), form)
            .await
            .map_err(TransferError::Upload)?;

        tracing::info!(
            project = %project,
            asset_id = asset.id,
            file_name = %file.name(),
            size = file.size(),
            "Asset uploaded"
        );

        Ok(asset)
    }
}
