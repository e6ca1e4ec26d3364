//! API error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mkb_store::StoreError;
use mkb_tasks::TaskError;
use serde_json::json;

/// An error already mapped to its HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match &e {
            // Traversal attempts look identical to missing files.
            StoreError::NotFound(_) | StoreError::OutsideBase(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            StoreError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<TaskError> for ApiError {
    fn from(e: TaskError) -> Self {
        let status = match &e {
            TaskError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskError::IllegalTransition { .. } => StatusCode::CONFLICT,
            TaskError::Invalid(_) => StatusCode::BAD_REQUEST,
        };
        Self::new(status, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn traversal_maps_to_not_found() {
        let err: ApiError = StoreError::OutsideBase(PathBuf::from("../etc")).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn illegal_transition_maps_to_conflict() {
        let err: ApiError = TaskError::IllegalTransition {
            id: mkb_tasks::TaskId::new(),
            from: mkb_tasks::TaskStatus::Pending,
            to: mkb_tasks::TaskStatus::Completed,
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
