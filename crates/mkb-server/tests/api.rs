#![allow(missing_docs)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use mkb_server::{router, AppState};
use mkb_store::{Category, KnowledgeBase, Metadata, INDEX_FILENAME};
use mkb_tasks::{InMemoryTaskRepository, TaskRepository};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct Fixture {
    _dir: TempDir,
    kb: KnowledgeBase,
    repo: Arc<InMemoryTaskRepository>,
    app: Router,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let kb = KnowledgeBase::open(dir.path().join("knowledge_base")).unwrap();
    let repo = Arc::new(InMemoryTaskRepository::new());
    let state = AppState::new(kb.clone(), Arc::clone(&repo) as Arc<dyn TaskRepository>);
    Fixture {
        _dir: dir,
        kb,
        repo,
        app: router(state),
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn send_empty(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn stats_reports_seeded_documents() {
    let f = fixture();
    f.kb.add_document(Category::Midnight, "Dust", "dust notes", Metadata::new())
        .unwrap();
    f.kb.add_document(Category::Cardano, "Plutus", "plutus notes", Metadata::new())
        .unwrap();

    let (status, body) = get(&f.app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_documents"], 2);
    assert_eq!(body["categories"]["midnight"]["count"], 1);
}

#[tokio::test]
async fn recent_rejects_unknown_category() {
    let f = fixture();
    let (status, body) = get(&f.app, "/api/recent?category=defi").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("defi"));
}

#[tokio::test]
async fn search_without_query_is_empty() {
    let f = fixture();
    f.kb.add_document(Category::Research, "Anything", "text", Metadata::new())
        .unwrap();

    let (status, body) = get(&f.app, "/api/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn search_matches_case_insensitively_with_preview() {
    let f = fixture();
    f.kb.add_document(
        Category::Midnight,
        "Privacy",
        "The DUST token pays fees.",
        Metadata::new(),
    )
    .unwrap();

    let (status, body) = get(&f.app, "/api/search?q=dust").await;
    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0]["preview"].as_str().unwrap().contains("DUST"));
}

#[tokio::test]
async fn document_view_returns_content_and_html() {
    let f = fixture();
    let rel = f
        .kb
        .add_document(Category::Zkproofs, "Halo", "## Circuits\n\nok", Metadata::new())
        .unwrap();

    let uri = format!("/api/document/{}", rel.display());
    let (status, body) = get(&f.app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["content"].as_str().unwrap().contains("# Halo"));
    assert!(body["html"].as_str().unwrap().contains("<h2>Circuits</h2>"));
}

#[tokio::test]
async fn missing_document_is_404() {
    let f = fixture();
    let (status, body) = get(&f.app, "/api/document/midnight/absent.md").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn traversal_is_404() {
    let f = fixture();
    let (status, _) = get(&f.app, "/api/document/..%2Fsecrets.md").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_document_regenerates_index() {
    let f = fixture();
    let rel = f
        .kb
        .add_document(Category::Research, "Temp", "to be removed", Metadata::new())
        .unwrap();

    let uri = format!("/api/document/{}", rel.display());
    let (status, _) = send_empty(&f.app, "DELETE", &uri).await;
    assert_eq!(status, StatusCode::OK);

    let index = f
        .kb
        .get_document(std::path::Path::new(INDEX_FILENAME))
        .unwrap();
    assert!(index.contains("**Total Documents: 0**"));
}

#[tokio::test]
async fn bulk_delete_reports_each_path() {
    let f = fixture();
    let rel = f
        .kb
        .add_document(Category::Cardano, "Keep Count", "x", Metadata::new())
        .unwrap();

    let (status, body) = send_json(
        &f.app,
        "POST",
        "/api/documents/bulk-delete",
        json!({ "paths": [rel.display().to_string(), "../outside.md"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results[0]["deleted"], true);
    assert_eq!(results[1]["deleted"], false);
}

#[tokio::test]
async fn cleanup_requires_confirmation() {
    let f = fixture();
    f.kb.add_document(
        Category::Midnight,
        "Documentation (Error)",
        "failed run",
        Metadata::new(),
    )
    .unwrap();

    let (status, _) = send_json(&f.app, "POST", "/api/documents/cleanup", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &f.app,
        "POST",
        "/api/documents/cleanup",
        json!({ "confirm": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);
    assert!(f.kb.find_error_documents().unwrap().is_empty());
}

#[tokio::test]
async fn task_creation_validates_topic() {
    let f = fixture();
    let (status, body) =
        send_json(&f.app, "POST", "/api/tasks", json!({ "topic": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn task_lifecycle_over_http() {
    let f = fixture();
    let (status, task) = send_json(
        &f.app,
        "POST",
        "/api/tasks",
        json!({ "topic": "Midnight governance", "context": "voting" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "pending");
    let id = task["id"].as_str().unwrap().to_string();

    let (status, approved) =
        send_empty(&f.app, "POST", &format!("/api/tasks/{id}/approve")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    // Already approved: deny is now illegal.
    let (status, _) = send_empty(&f.app, "POST", &format!("/api/tasks/{id}/deny")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = get(&f.app, "/api/tasks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send_empty(&f.app, "DELETE", &format!("/api/tasks/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(f.repo.all().await.is_empty());
}

#[tokio::test]
async fn unknown_task_id_is_404() {
    let f = fixture();
    let (status, _) = send_empty(
        &f.app,
        "POST",
        "/api/tasks/01ARZ3NDEKTSV4RRFFQ69G5FAV/approve",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_empty(&f.app, "POST", "/api/tasks/not-a-ulid/approve").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
