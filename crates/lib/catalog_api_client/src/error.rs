//! Client error types.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not logged in: run 'catalog login' first")]
    NotLoggedIn,

    #[error("server unreachable: {0}")]
    Unreachable(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("corrupt credentials file {}: {reason}", .path.display())]
    CorruptCredentials { path: PathBuf, reason: String },

    #[error("could not determine configuration directory")]
    NoConfigDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            // Connect failures, timeouts and broken bodies all mean the
            // server could not be talked to.
            ClientError::Unreachable(e.to_string())
        }
    }
}
