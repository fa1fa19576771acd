use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("{}", .0)]
    Client(#[from] catalog_api_client::ClientError),

    #[error("{}", .0)]
    Auth(#[from] catalog_core::auth::AuthError),

    #[error("Prompt::{:?}: {}", .0, .0)]
    Prompt(#[from] dialoguer::Error),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),
}
