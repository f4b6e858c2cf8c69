//! API error types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use labelscope_core::Error as CoreError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request parameter
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A store failed to answer
    #[error("Store error: {0}")]
    Store(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request_error",
            ApiError::NotFound(_) => "not_found_error",
            ApiError::Store(_) => "store_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            CoreError::Store(msg) => ApiError::Store(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let message = match &self {
            ApiError::InvalidRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Store(msg)
            | ApiError::Internal(msg) => msg.clone(),
        };

        let body = serde_json::json!({
            "error": {
                "message": message,
                "type": self.error_type(),
                "code": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_status() {
        let cases = [
            (
                CoreError::InvalidRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::NotFound("r1".to_string()), StatusCode::NOT_FOUND),
            (
                CoreError::Store("down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CoreError::Config("broken".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (core, status) in cases {
            assert_eq!(ApiError::from(core).status(), status);
        }
    }

    #[test]
    fn test_store_message_passes_through() {
        let err = ApiError::from(CoreError::Store("etcd unavailable".to_string()));
        assert!(matches!(err, ApiError::Store(ref msg) if msg == "etcd unavailable"));
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::InvalidRequest("label is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
