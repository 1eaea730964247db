//! Application error type mapping backend failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use parley_types::error::BackendError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure reported by the active backend.
    Backend(BackendError),
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        AppError::Backend(e)
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Backend(BackendError::Upstream { .. }) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            AppError::Backend(BackendError::MalformedResponse(_)) => {
                (StatusCode::BAD_GATEWAY, "MALFORMED_UPSTREAM_RESPONSE")
            }
            AppError::Backend(BackendError::AuthenticationFailed) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_AUTH_FAILED")
            }
            AppError::Backend(BackendError::SessionNotStarted) => {
                (StatusCode::CONFLICT, "SESSION_NOT_STARTED")
            }
            AppError::Backend(BackendError::InvalidConfig(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_CONFIG")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let AppError::Backend(err) = &self;
        let message = err.to_string();

        tracing::warn!(%status, code, "request failed: {message}");

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                BackendError::Upstream {
                    message: "down".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                BackendError::MalformedResponse("no message".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (BackendError::AuthenticationFailed, StatusCode::BAD_GATEWAY),
            (BackendError::SessionNotStarted, StatusCode::CONFLICT),
            (
                BackendError::InvalidConfig("bad".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
