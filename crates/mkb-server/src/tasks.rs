//! Task queue endpoints
//!
//! The approval gate lives here: tasks are created `pending` and only a
//! human approve/deny moves them on. Unknown ids are 404, lifecycle
//! violations 409.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mkb_tasks::{ResearchTask, TaskId, TaskStatus};
use serde::Deserialize;
use serde_json::{json, Value};

fn parse_id(id: &str) -> Result<TaskId, ApiError> {
    TaskId::parse(id).map_err(|_| ApiError::not_found(format!("task not found: {id}")))
}

/// `GET /api/tasks`
pub async fn list(State(state): State<AppState>) -> Json<Vec<ResearchTask>> {
    Json(state.repo.all().await)
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    topic: String,
    #[serde(default)]
    context: String,
    #[serde(default)]
    source_type: Option<String>,
    #[serde(default)]
    source_url: String,
}

/// `POST /api/tasks`
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ResearchTask>), ApiError> {
    let task = ResearchTask::new(request.topic)
        .with_context(request.context)
        .with_source_type(request.source_type.unwrap_or_else(|| "web".to_string()))
        .with_source_url(request.source_url);
    state.repo.insert(task.clone()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `POST /api/tasks/:id/approve`
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResearchTask>, ApiError> {
    let id = parse_id(&id)?;
    let task = state.repo.update_status(id, TaskStatus::Approved).await?;
    Ok(Json(task))
}

#[derive(Debug, Default, Deserialize)]
pub struct DenyRequest {
    #[serde(default)]
    reason: Option<String>,
}

/// `POST /api/tasks/:id/deny`
///
/// The body is optional; a JSON `reason` is logged with the transition.
pub async fn deny(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: axum::body::Bytes,
) -> Result<Json<ResearchTask>, ApiError> {
    let id = parse_id(&id)?;
    let reason = serde_json::from_slice::<DenyRequest>(&body)
        .ok()
        .and_then(|b| b.reason);
    let task = state.repo.update_status(id, TaskStatus::Denied).await?;
    if let Some(reason) = reason {
        tracing::info!(task = %id, reason, "task denied");
    }
    Ok(Json(task))
}

/// `DELETE /api/tasks/:id`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state.repo.delete(id).await;
    Ok(Json(json!({ "deleted": id.to_string() })))
}
