//! HTTP error type and the JSON response envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::FeedError;

/// Response envelope shared by every JSON route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid query or body).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No upstream could serve the request, or a feature is not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A backend the request depends on failed.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    fn status(&self) -> StatusCode {
        match self {
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HttpError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            HttpError::NotFound(msg)
            | HttpError::BadRequest(msg)
            | HttpError::ServiceUnavailable(msg)
            | HttpError::BadGateway(msg)
            | HttpError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        }
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message().to_string()),
        };
        (status, Json(body)).into_response()
    }
}

impl From<FeedError> for HttpError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Validation(msg) => HttpError::BadRequest(msg),
            e @ (FeedError::TotalFailure { .. } | FeedError::NoProvider) => {
                HttpError::ServiceUnavailable(e.to_string())
            }
            e @ FeedError::Translation(_) => HttpError::BadGateway(e.to_string()),
            e => HttpError::Internal(e.to_string()),
        }
    }
}
