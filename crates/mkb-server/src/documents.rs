//! Document and store endpoints

use crate::error::ApiError;
use crate::render::markdown_to_html;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use mkb_store::{Category, DocEntry, IndexBuilder, KbStats, SearchHit};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_RECENT_LIMIT: usize = 10;

/// `GET /api/stats`
pub async fn stats(State(state): State<AppState>) -> Result<Json<KbStats>, ApiError> {
    Ok(Json(state.kb.stats()?))
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    category: Option<String>,
    limit: Option<usize>,
}

/// `GET /api/recent?category=&limit=`
pub async fn recent(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<DocEntry>>, ApiError> {
    let category = params
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(str::parse::<Category>)
        .transpose()?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Ok(Json(state.kb.recent(category, limit)?))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// `GET /api/search?q=`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    Ok(Json(state.kb.search_hits(&query, None)?))
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    path: String,
    content: String,
    html: String,
}

/// `GET /api/document/<path>`
pub async fn get_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let content = state.kb.get_document(std::path::Path::new(&path))?;
    let html = markdown_to_html(&content);
    Ok(Json(DocumentResponse {
        path,
        content,
        html,
    }))
}

/// `DELETE /api/document/<path>`
pub async fn delete_document(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.kb.delete(std::path::Path::new(&path))?;
    IndexBuilder::new(state.kb.clone()).rebuild()?;
    Ok(Json(json!({ "deleted": path })))
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    paths: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteEntry {
    path: String,
    deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `POST /api/documents/bulk-delete`
///
/// Deletes each path independently and reports per-path outcomes; the
/// index is regenerated once when anything was deleted.
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<Vec<BulkDeleteEntry>>, ApiError> {
    let mut results = Vec::with_capacity(request.paths.len());
    let mut any_deleted = false;
    for path in request.paths {
        match state.kb.delete(std::path::Path::new(&path)) {
            Ok(()) => {
                any_deleted = true;
                results.push(BulkDeleteEntry {
                    path,
                    deleted: true,
                    error: None,
                });
            }
            Err(e) => results.push(BulkDeleteEntry {
                path,
                deleted: false,
                error: Some(e.to_string()),
            }),
        }
    }
    if any_deleted {
        IndexBuilder::new(state.kb.clone()).rebuild()?;
    }
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
pub struct CleanupRequest {
    #[serde(default)]
    confirm: bool,
}

/// `POST /api/documents/cleanup`
///
/// Deletes every failed-generation artifact. Destructive, so the body
/// must carry `confirm: true`.
pub async fn cleanup(
    State(state): State<AppState>,
    Json(request): Json<CleanupRequest>,
) -> Result<Json<Value>, ApiError> {
    if !request.confirm {
        return Err(ApiError::bad_request("cleanup requires confirm: true"));
    }
    let paths = state.kb.find_error_documents()?;
    for path in &paths {
        state.kb.delete(path)?;
    }
    if !paths.is_empty() {
        IndexBuilder::new(state.kb.clone()).rebuild()?;
    }
    tracing::info!(count = paths.len(), "error documents cleaned up");
    Ok(Json(json!({
        "deleted": paths.len(),
        "paths": paths,
    })))
}
