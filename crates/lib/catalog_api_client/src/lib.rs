//! # catalog_api_client
//!
//! Client side of the catalog auth API: a small HTTP client that keeps the
//! caller's access token fresh, and the on-disk store for credentials.

pub mod client;
pub mod credentials;
pub mod error;
pub mod models;

pub use client::{AuthClient, ClientConfig, Identity, LogoutOutcome, needs_refresh};
pub use credentials::{CredentialStore, Credentials};
pub use error::{ClientError, Result};
