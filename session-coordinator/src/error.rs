//! The error taxonomy from spec §7, rendered straight to an HTTP response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("game not found")]
    RoomNotFound,
    #[error("endpoint not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("internal server error")]
    Internal,
}

impl CoordinatorError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoordinatorError::RoomNotFound | CoordinatorError::NotFound => StatusCode::NOT_FOUND,
            CoordinatorError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoordinatorError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoordinatorError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if matches!(self, CoordinatorError::Internal) {
            tracing::error!(error = %self, "Internal error while handling request.");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
