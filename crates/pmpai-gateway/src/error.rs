//! HTTP mapping for the pipeline error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use pmpai_core::error::PmpError;

/// Wrapper that turns a `PmpError` into a JSON error response with the
/// right status code. Handlers return `Result<Json<Value>, ApiError>`.
pub struct ApiError(pub PmpError);

impl From<PmpError> for ApiError {
    fn from(e: PmpError) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PmpError::InvalidRequest(_)
            | PmpError::UnsupportedFormat(_)
            | PmpError::ExtractionFailed { .. }
            | PmpError::EmptyContent { .. } => StatusCode::BAD_REQUEST,
            PmpError::NotFound(_) => StatusCode::NOT_FOUND,
            PmpError::DownstreamUnavailable(_)
            | PmpError::Store(_)
            | PmpError::Config(_)
            | PmpError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        let body = Json(serde_json::json!({
            "ok": false,
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
