//! # catalog_api
//!
//! HTTP API library for the catalog auth endpoints.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use catalog_core::auth::blacklist::TokenBlacklist;
use catalog_core::auth::directory::UserDirectory;
use catalog_core::auth::jwt::TokenCodec;
use catalog_core::auth::manager::TokenManager;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{auth, health};
use crate::services::auth::AuthService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Login/refresh/logout orchestration.
    pub auth: AuthService,
}

impl AppState {
    /// Wire a token manager with a fresh blacklist around `directory`.
    pub fn new(config: ApiConfig, directory: Arc<dyn UserDirectory>) -> Self {
        let tokens = TokenManager::new(
            TokenCodec::new(config.jwt_secret.as_bytes()),
            Arc::new(TokenBlacklist::new()),
            config.token_ttls,
        );
        let auth = AuthService::new(directory, Arc::new(tokens), config.lookup_timeout);
        Self { auth }
    }

    /// The blacklist shared by every request.
    pub fn blacklist(&self) -> &Arc<TokenBlacklist> {
        self.auth.tokens().blacklist()
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_HEALTHZ, get(health::healthz))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_REFRESH, post(auth::refresh_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::POST_AUTH_LOGOUT, post(auth::logout_handler))
        .route(routes::GET_AUTH_ME, get(auth::me_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
