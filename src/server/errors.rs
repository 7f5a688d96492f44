use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;
use tracing::error;

use crate::errors::ConnectorError;
use crate::observability::metrics::try_get_metrics;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    status_code: u16,
    message: String,
}

impl ConnectorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConnectorError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ConnectorError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ConnectorError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ConnectorError::Authorization(_)
            | ConnectorError::Upstream { .. }
            | ConnectorError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to API callers.
    pub fn public_message(&self) -> String {
        match self {
            ConnectorError::InvalidArgument(msg) => msg.clone(),
            ConnectorError::Unauthorized(_) => "Unauthorized access.".to_string(),
            ConnectorError::Timeout(_) => "Request timed out.".to_string(),
            _ => "An unexpected error occurred.".to_string(),
        }
    }
}

impl IntoResponse for ConnectorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!("request failed with {}: {}", status.as_u16(), self);
        if let Some(metrics) = try_get_metrics() {
            metrics
                .http_errors
                .with_label_values(&[status.as_str()])
                .inc();
        }

        let body = ErrorResponse {
            status_code: status.as_u16(),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
