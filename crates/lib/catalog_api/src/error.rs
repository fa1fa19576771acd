//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_core::auth::AuthError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Message returned for every rejected token, whatever the reason.
pub const INVALID_TOKEN_MESSAGE: &str = "invalid or expired token";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Unavailable(m) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", m.as_str())
            }
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

/// Token validity kinds collapse to one 401 so callers get no oracle.
impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::Unauthorized("invalid credentials".into()),
            AuthError::InvalidRefreshToken => {
                AppError::Unauthorized("invalid refresh token".into())
            }
            AuthError::Expired
            | AuthError::Revoked
            | AuthError::Malformed(_)
            | AuthError::InvalidSignature
            | AuthError::ClaimsMissing(_)
            | AuthError::WrongTokenType => AppError::Unauthorized(INVALID_TOKEN_MESSAGE.into()),
            AuthError::NotFound(msg) => AppError::NotFound(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::Unavailable(msg) => AppError::Unavailable(msg),
            AuthError::TokenError(msg) | AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_errors_share_one_message() {
        for e in [
            AuthError::Expired,
            AuthError::Revoked,
            AuthError::InvalidSignature,
            AuthError::Malformed("bad".into()),
        ] {
            match AppError::from(e) {
                AppError::Unauthorized(m) => assert_eq!(m, INVALID_TOKEN_MESSAGE),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn internal_errors_hide_detail() {
        let resp = AppError::Internal("secret detail".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unavailable_maps_to_503() {
        let resp = AppError::from(AuthError::Unavailable("slow".into())).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
