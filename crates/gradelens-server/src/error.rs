//! Mapping from analytics errors to HTTP responses.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use gradelens_core::AnalyticsError;

/// JSON error body: `{"error": "<kind>", "message": "<text>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    Analytics(AnalyticsError),
    /// A reload that could not fetch or validate new data.
    Reload(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Analytics(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Analytics(AnalyticsError::UndefinedResult(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Analytics(AnalyticsError::EmptyDataset) => StatusCode::SERVICE_UNAVAILABLE,
            // Bad records or a failed reload are server-side faults.
            ApiError::Analytics(_) | ApiError::Reload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Analytics(e) => ErrorBody {
                error: e.kind().to_string(),
                message: e.to_string(),
            },
            ApiError::Reload(e) => ErrorBody {
                error: "reload_failed".to_string(),
                message: format!("{e:#}"),
            },
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        ApiError::Analytics(e)
    }
}

// A query string that fails to deserialize (e.g. a repeated key) is reported
// like any other bad parameter.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Analytics(AnalyticsError::InvalidParameter {
            name: "query".to_string(),
            reason: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        if status.is_server_error() {
            tracing::error!(kind = %body.error, "{}", body.message);
        } else {
            tracing::debug!(kind = %body.error, status = status.as_u16(), "{}", body.message);
        }
        (status, Json(body)).into_response()
    }
}
