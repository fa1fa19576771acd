//! API server configuration.

use std::time::Duration;

use catalog_core::auth::manager::TokenTtls;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default bound on a single user directory lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default interval between blacklist purges.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:8080").
    pub bind_addr: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access and refresh token lifetimes.
    pub token_ttls: TokenTtls,
    /// Upper bound on one user directory lookup.
    pub lookup_timeout: Duration,
    /// How often expired blacklist entries are purged.
    pub purge_interval: Duration,
}

impl ApiConfig {
    /// Configuration with default lifetimes and timeouts.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: jwt_secret.into(),
            token_ttls: TokenTtls::default(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            purge_interval: DEFAULT_PURGE_INTERVAL,
        }
    }
}
