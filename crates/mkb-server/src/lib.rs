//! HTTP dashboard API
//!
//! JSON in, JSON out: store queries, document retrieval with rendered
//! HTML, deletion and cleanup, and the task queue with its approval gate.
//! Handlers hold no state beyond [`AppState`]; the background worker runs
//! elsewhere and shares only the store and the task repository.

pub mod documents;
pub mod error;
pub mod render;
pub mod tasks;

pub use error::ApiError;

use axum::routing::{delete, get, post};
use axum::Router;
use mkb_store::KnowledgeBase;
use mkb_tasks::TaskRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Document store
    pub kb: KnowledgeBase,
    /// Task queue
    pub repo: Arc<dyn TaskRepository>,
}

impl AppState {
    #[must_use]
    pub fn new(kb: KnowledgeBase, repo: Arc<dyn TaskRepository>) -> Self {
        Self { kb, repo }
    }
}

/// Build the API router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/stats", get(documents::stats))
        .route("/api/recent", get(documents::recent))
        .route("/api/search", get(documents::search))
        .route(
            "/api/document/{*path}",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/api/documents/bulk-delete", post(documents::bulk_delete))
        .route("/api/documents/cleanup", post(documents::cleanup))
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/{id}/approve", post(tasks::approve))
        .route("/api/tasks/{id}/deny", post(tasks::deny))
        .route("/api/tasks/{id}", delete(tasks::remove))
        .with_state(state)
}

/// Serve the API until `shutdown` flips to true.
///
/// # Errors
///
/// Fails when the listener cannot bind or the server loop errors.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let app = router(state);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // A dropped sender also means shutdown.
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;
    tracing::info!("api stopped");
    Ok(())
}
