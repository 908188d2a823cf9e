//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Authentication and authorization errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing authorization header.
    #[error("missing authorization header")]
    MissingAuthHeader,

    /// Invalid authorization header format.
    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    /// Token could not be decoded or its signature did not verify.
    #[error("invalid token: {0}")]
    Malformed(String),

    /// Token expired.
    #[error("token expired")]
    Expired,

    /// Token was validly signed but its claims are unusable.
    #[error("invalid token claims: {0}")]
    InvalidClaims(&'static str),

    /// Invalid credentials at login. Deliberately covers both unknown
    /// identity and wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The caller's role is not in the endpoint's required set.
    #[error("insufficient role")]
    InsufficientRole,

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            AuthError::MissingAuthHeader => (StatusCode::UNAUTHORIZED, "missing_auth_header"),
            AuthError::InvalidAuthHeader => (StatusCode::UNAUTHORIZED, "invalid_auth_header"),
            AuthError::Malformed(_) => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AuthError::Expired => (StatusCode::UNAUTHORIZED, "token_expired"),
            AuthError::InvalidClaims(_) => (StatusCode::UNAUTHORIZED, "invalid_token_claims"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AuthError::InsufficientRole => (StatusCode::FORBIDDEN, "insufficient_role"),
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(AuthErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}
