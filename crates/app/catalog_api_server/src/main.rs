//! Catalog auth API server binary.
//!
//! Serves login, refresh, logout and whoami over HTTP. Users come from a YAML
//! file and/or a bootstrap admin configured through the environment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use catalog_api::config::ApiConfig;
use catalog_core::auth::directory::StaticUserDirectory;
use catalog_core::auth::jwt::resolve_jwt_secret;
use catalog_core::auth::manager::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS, TokenTtls};
use clap::Parser;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "catalog_api_server", about = "Catalog auth API server")]
struct Args {
    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "CATALOG_PORT", default_value_t = 8080)]
    port: u16,

    /// Interface to bind.
    #[arg(long, env = "CATALOG_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// YAML file listing users and their bcrypt password hashes.
    #[arg(long, env = "CATALOG_USERS_FILE")]
    users_file: Option<PathBuf>,

    /// Username of the bootstrap admin account.
    #[arg(long, env = "CATALOG_ADMIN_USERNAME", default_value = "admin")]
    admin_username: String,

    /// bcrypt hash of the bootstrap admin password (see `catalog hashpw`).
    #[arg(long, env = "CATALOG_ADMIN_PASSWORD_HASH", hide_env_values = true)]
    admin_password_hash: Option<String>,

    /// Access token lifetime in seconds.
    #[arg(long, env = "CATALOG_ACCESS_TTL_SECS", default_value_t = DEFAULT_ACCESS_TTL_SECS)]
    access_ttl_secs: i64,

    /// Refresh token lifetime in seconds.
    #[arg(long, env = "CATALOG_REFRESH_TTL_SECS", default_value_t = DEFAULT_REFRESH_TTL_SECS)]
    refresh_ttl_secs: i64,

    /// Upper bound on a single user directory lookup.
    #[arg(long, env = "CATALOG_LOOKUP_TIMEOUT_SECS", default_value_t = 5)]
    lookup_timeout_secs: u64,

    /// Interval between purges of expired blacklist entries.
    #[arg(long, env = "CATALOG_PURGE_INTERVAL_SECS", default_value_t = 60)]
    purge_interval_secs: u64,
}

impl Args {
    fn api_config(&self, jwt_secret: String) -> Result<ApiConfig, String> {
        if self.access_ttl_secs <= 0 || self.refresh_ttl_secs <= 0 {
            return Err("token lifetimes must be positive".into());
        }
        if self.refresh_ttl_secs < self.access_ttl_secs {
            return Err("refresh token lifetime must not be shorter than access token lifetime".into());
        }
        if self.lookup_timeout_secs == 0 || self.purge_interval_secs == 0 {
            return Err("lookup timeout and purge interval must be positive".into());
        }

        Ok(ApiConfig {
            bind_addr: format!("{}:{}", self.bind, self.port),
            jwt_secret,
            token_ttls: TokenTtls {
                access: chrono::Duration::seconds(self.access_ttl_secs),
                refresh: chrono::Duration::seconds(self.refresh_ttl_secs),
            },
            lookup_timeout: Duration::from_secs(self.lookup_timeout_secs),
            purge_interval: Duration::from_secs(self.purge_interval_secs),
        })
    }

    fn user_directory(&self) -> Result<StaticUserDirectory, Box<dyn std::error::Error>> {
        let mut directory = match &self.users_file {
            Some(path) => {
                let dir = StaticUserDirectory::from_yaml_file(path)?;
                info!(path = %path.display(), users = dir.len(), "loaded users file");
                dir
            }
            None => StaticUserDirectory::new(),
        };

        if let Some(hash) = &self.admin_password_hash {
            directory = directory.with_bootstrap_admin(&self.admin_username, hash.clone())?;
            info!(username = %self.admin_username, "bootstrap admin enabled");
        }

        if directory.is_empty() {
            return Err("no users configured: set CATALOG_USERS_FILE or CATALOG_ADMIN_PASSWORD_HASH".into());
        }
        Ok(directory)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,catalog_api=debug,catalog_core=debug".into()),
        )
        .init();

    let args = Args::parse();
    info!(bind = %args.bind, port = args.port, "starting catalog_api_server");

    let config = args.api_config(resolve_jwt_secret())?;
    let directory = args.user_directory()?;

    let state = catalog_api::AppState::new(config.clone(), Arc::new(directory));
    let purge = state.blacklist().spawn_purge_task(config.purge_interval);

    let app = catalog_api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
