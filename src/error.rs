use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// ApiError
///
/// Central error taxonomy for the HTTP layer. Every failure path a handler
/// can take maps to one of these variants, which in turn maps to a status
/// code and a JSON `{"error": ...}` body.
///
/// Storage and notification failures are deliberately absent: they are
/// non-fatal, caught where they occur, logged, and surfaced as informational
/// fields in otherwise successful responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing token")]
    Unauthenticated,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    // Token verified but the subject no longer resolves to a user record.
    #[error("Unknown user")]
    UnknownUser,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    // Identity-provider exchange failed (network, token endpoint, userinfo).
    #[error("Authentication error: {0}")]
    UpstreamAuth(String),

    #[error("User email not verified")]
    EmailNotVerified,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated
            | ApiError::TokenExpired
            | ApiError::TokenInvalid
            | ApiError::UnknownUser => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::EmailNotVerified => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UpstreamAuth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
