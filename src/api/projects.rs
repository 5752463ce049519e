//! Project endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::http::ApiClient;
use crate::upload::ProjectId;

/// Editing project owned by the authenticated member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn project_path(id: ProjectId) -> String {
    format!("/api/projects/{}/", id)
}

impl ApiClient {
    /// GET /api/projects/
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get("/api/projects/").await
    }

    /// POST /api/projects/
    pub async fn create_project(&self, title: &str) -> Result<Project> {
        let project: Project = self.post_json("/api/projects/", &json!({ "title": title })).await?;
        tracing::info!(project_id = %project.id, title = %project.title, "Created project");
        Ok(project)
    }

    /// GET /api/projects/{id}/
    pub async fn get_project(&self, id: ProjectId) -> Result<Project> {
        self.get(&project_path(id)).await
    }

    /// PATCH /api/projects/{id}/
    pub async fn rename_project(&self, id: ProjectId, title: &str) -> Result<Project> {
        self.patch_json(&project_path(id), &json!({ "title": title })).await
    }

    /// DELETE /api/projects/{id}/
    pub async fn delete_project(&self, id: ProjectId) -> Result<()> {
        self.delete(&project_path(id)).await?;
        tracing::info!(project_id = %id, "Deleted project");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::sync::Arc;

    type Store = Arc<Mutex<Vec<Value>>>;

    fn router(store: Store) -> Router {
        Router::new()
            .route(
                "/api/projects/",
                get(|State(store): State<Store>| async move { Json(Value::Array(store.lock().clone())) })
                    .post(|State(store): State<Store>, Json(body): Json<Value>| async move {
                        let mut projects = store.lock();
                        let project = json!({ "id": projects.len(), "title": body["title"] });
                        projects.push(project.clone());
                        (StatusCode::CREATED, Json(project))
                    }),
            )
            .route(
                "/api/projects/:id/",
                get(|State(store): State<Store>, Path(id): Path<usize>| async move {
                    match store.lock().get(id) {
                        Some(p) => (StatusCode::OK, Json(p.clone())),
                        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))),
                    }
                })
                .patch(
                    |State(store): State<Store>, Path(id): Path<usize>, Json(body): Json<Value>| async move {
                        let mut projects = store.lock();
                        projects[id]["title"] = body["title"].clone();
                        Json(projects[id].clone())
                    },
                )
                .delete(|| async { StatusCode::NO_CONTENT }),
            )
            .with_state(store)
    }

    #[tokio::test]
    async fn test_project_crud() {
        let store: Store = Arc::default();
        let base = spawn_server(router(store.clone())).await;
        let client = ApiClient::new(&base).unwrap();

        assert!(client.list_projects().await.unwrap().is_empty());

        // The first project gets id 0, which must round-trip like any other
        let created = client.create_project("Trailer").await.unwrap();
        assert_eq!(created.id, ProjectId(0));
        client.create_project("Vlog").await.unwrap();

        let fetched = client.get_project(ProjectId(0)).await.unwrap();
        assert_eq!(fetched.title, "Trailer");

        let renamed = client.rename_project(ProjectId(1), "Vlog #2").await.unwrap();
        assert_eq!(renamed.title, "Vlog #2");

        let titles: Vec<String> = client
            .list_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Trailer", "Vlog #2"]);

        client.delete_project(ProjectId(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_project() {
        let base = spawn_server(router(Arc::default())).await;
        let client = ApiClient::new(&base).unwrap();

        let err = client.get_project(ProjectId(9)).await.unwrap_err();
        assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
        assert!(err.to_string().ends_with("Not found."));
    }
}
