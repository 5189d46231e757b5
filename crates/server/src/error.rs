//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pngtrim_core::Error;
use pngtrim_telemetry::metrics;
use tracing::{error, warn};

/// Body sent for every server-side failure. Details stay in the logs.
pub const GENERIC_FAILURE: &str = "Error processing images";

/// Handler error, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    /// Status code the error is reported with.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Message shown to the client.
    pub fn public_message(&self) -> &str {
        if self.0.code.is_client_error() {
            &self.0.message
        } else {
            GENERIC_FAILURE
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = &self.0;

        if err.code.is_client_error() {
            warn!(code = %err.code, status = status.as_u16(), error = %err, "Request rejected");
        } else {
            error!(status = status.as_u16(), report = ?err.to_report(), "Request failed");
        }
        metrics().increment("requests_failed_total");

        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}
