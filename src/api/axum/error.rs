use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::SessionError;

/// converts `SessionError` into a plain 500 response
#[derive(Debug)]
pub struct AppError(pub SessionError);

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
