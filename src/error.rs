use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::completion::CompletionError;

// Everything POST /chat can fail with
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            RelayError::InvalidRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "invalid_request", "message": message}),
            ),
            RelayError::RateLimited { retry_after_seconds } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({"error": "rate_limited", "retry_after_seconds": retry_after_seconds}),
            ),
            RelayError::Completion(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "openai_error", "message": err.to_string()}),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_per_kind() {
        let cases = [
            (RelayError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                RelayError::RateLimited {
                    retry_after_seconds: 3,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                RelayError::Completion(CompletionError::Status {
                    status: reqwest::StatusCode::BAD_GATEWAY,
                    message: "down".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
