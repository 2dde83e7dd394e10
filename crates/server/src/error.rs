//! Application error handling
//!
//! Every error renders as a flat `{ "error": "<message>" }` body. Messages
//! are caller-safe; causes are logged where the error is raised.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use healthsync_core::{AuthError, ChatError, Unavailable, ValidationError};
use serde_json::json;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    TooManyRequests(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::TooManyRequests(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        let msg = err.to_string();
        match err {
            ChatError::Unauthenticated(_) => AppError::Unauthorized(msg),
            ChatError::InvalidInput(_) => AppError::BadRequest(msg),
            ChatError::Forbidden => AppError::Forbidden(msg),
            ChatError::NotFound => AppError::NotFound(msg),
            ChatError::ServiceUnavailable(Unavailable::NotConfigured) => AppError::Internal(msg),
            ChatError::ServiceUnavailable(Unavailable::Database) => {
                AppError::ServiceUnavailable(msg)
            }
            ChatError::UpstreamError => AppError::ServiceUnavailable(msg),
            ChatError::InternalError => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!(error = %err, "Rejected request body");
        AppError::BadRequest("Invalid request body".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_errors_map_to_contract_statuses() {
        let cases = [
            (ChatError::from(AuthError::Missing), StatusCode::UNAUTHORIZED),
            (
                ChatError::from(ValidationError::QuestionRequired),
                StatusCode::BAD_REQUEST,
            ),
            (ChatError::Forbidden, StatusCode::FORBIDDEN),
            (ChatError::NotFound, StatusCode::NOT_FOUND),
            (
                ChatError::from(Unavailable::NotConfigured),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ChatError::from(Unavailable::Database),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ChatError::UpstreamError, StatusCode::SERVICE_UNAVAILABLE),
            (ChatError::InternalError, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err.clone()).status(), status, "{err:?}");
        }
    }
}
