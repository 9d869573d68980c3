//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use filesvc_common::Error;

/// Error returned by the REST handlers.
#[derive(Debug)]
pub struct RestError(pub Error);

impl RestError {
    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<Error> for RestError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.0.code(),
            "description": self.0.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
