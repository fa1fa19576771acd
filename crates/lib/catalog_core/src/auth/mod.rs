//! Authentication and token lifecycle logic.
//!
//! Provides JWT signing/verification, the revocation blacklist, the token
//! manager that ties them together, password hashing and the user directory
//! seam consumed by `catalog_api`.

pub mod blacklist;
pub mod directory;
pub mod jwt;
pub mod manager;
pub mod password;

use thiserror::Error;

/// Authentication errors.
///
/// Validity kinds (`Expired`, `Revoked`, `Malformed`, ...) stay distinct here
/// for logging; the HTTP layer collapses them into a single 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token expired")]
    Expired,

    #[error("Token revoked")]
    Revoked,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Missing token claim: {0}")]
    ClaimsMissing(String),

    #[error("Wrong token type")]
    WrongTokenType,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("User directory unavailable: {0}")]
    Unavailable(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for failures that mean "this token must not be accepted".
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::Expired
                | AuthError::Revoked
                | AuthError::Malformed(_)
                | AuthError::InvalidSignature
                | AuthError::ClaimsMissing(_)
                | AuthError::WrongTokenType
                | AuthError::InvalidRefreshToken
        )
    }
}
