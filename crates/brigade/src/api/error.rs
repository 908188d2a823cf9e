//! API error type and status mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::{AuthError, AuthzError, CredentialError};
use crate::task::TaskError;
use crate::user::UserError;

pub type ApiResult<T> = Result<T, ApiError>;

/// API-level error with a fixed status taxonomy:
/// 401 unauthenticated, 403 insufficient role / ownership, 404 missing
/// entity, 400 bad input, 503 store failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("store unavailable")]
    Unavailable(#[source] anyhow::Error),

    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ApiErrorResponse {
    error: String,
    error_code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(ApiErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(_) => Self::NotFound(err.to_string()),
            TaskError::OwnershipViolation => Self::Forbidden(err.to_string()),
            TaskError::Validation { .. } => Self::Validation(err.to_string()),
            TaskError::Store(source) => Self::Unavailable(source),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::Validation { .. } => Self::Validation(err.to_string()),
            UserError::Store(source) => Self::Unavailable(source),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            // Unknown email and wrong password must be indistinguishable
            CredentialError::UnknownEmail | CredentialError::BadPassword => {
                Self::Unauthorized("invalid credentials".to_string())
            }
            CredentialError::Store(source) => Self::Unavailable(source),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => Self::Unauthorized(err.to_string()),
            AuthzError::InsufficientRole => Self::Forbidden(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientRole => Self::Forbidden(err.to_string()),
            AuthError::Internal(message) => Self::Internal(anyhow::anyhow!(message)),
            _ => Self::Unauthorized(err.to_string()),
        }
    }
}
