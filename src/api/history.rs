//! Edit history endpoints
//!
//! Edits made in the preview are not rendered server-side; they are stored
//! as history entries holding the action and its parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::http::ApiClient;
use crate::upload::ProjectId;

/// Kind of edit recorded in a project's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    Trim,
    Merge,
    AddText,
    Crop,
}

/// Stored history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub action: EditAction,
    /// Action-specific parameters, e.g. `{"start": 1.5, "end": 4.0}` for a trim
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of a new history entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewHistoryEntry {
    pub action: EditAction,
    pub params: Value,
}

fn history_path(project: ProjectId) -> String {
    format!("/api/projects/{}/history/", project)
}

impl ApiClient {
    /// GET /api/projects/{id}/history/
    pub async fn list_history(&self, project: ProjectId) -> Result<Vec<HistoryEntry>> {
        self.get(&history_path(project)).await
    }

    /// POST /api/projects/{id}/history/
    pub async fn add_history(&self, project: ProjectId, entry: &NewHistoryEntry) -> Result<HistoryEntry> {
        self.post_json(&history_path(project), entry).await
    }
}
