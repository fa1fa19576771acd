//! Authentication request handlers.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use catalog_core::models::auth::TokenPair;
use tracing::{debug, error};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    LoginRequest, LogoutRequest, MessageResponse, RefreshRequest, TokenResponse, UserInfoResponse,
};

fn token_response(pair: TokenPair) -> TokenResponse {
    TokenResponse {
        expires_in: pair.access.claims.lifetime_secs(),
        access_token: pair.access.token,
        refresh_token: pair.refresh.token,
        token_type: "Bearer".to_string(),
    }
}

fn invalid_payload(rejection: JsonRejection) -> AppError {
    debug!(reason = %rejection, "rejected request body");
    AppError::Validation("invalid payload".into())
}

/// `POST /auth/login`: authenticate with username + password.
pub async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(body) = body.map_err(invalid_payload)?;
    let pair = state.auth.login(&body.username, &body.password).await?;
    Ok(Json(token_response(pair)))
}

/// `POST /auth/refresh`: exchange a refresh token for a new token pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(body) = body.map_err(invalid_payload)?;
    let pair = state.auth.refresh_tokens(&body.refresh_token)?;
    Ok(Json(token_response(pair)))
}

/// `POST /auth/logout`: revoke the bearer token. Requires authentication.
///
/// The body is optional; when it carries a `refresh_token` that token is
/// retired too. Failures here are internal, never a 401.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let request: LogoutRequest = if body.is_empty() {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            debug!(reason = %e, "ignoring unreadable logout body");
            LogoutRequest::default()
        })
    };

    state
        .auth
        .logout(&user.raw_token, request.refresh_token.as_deref())
        .map_err(|e| {
            error!(user_id = %user.user_id, error = %e, "logout failed");
            AppError::Internal(e.to_string())
        })?;

    Ok(Json(MessageResponse {
        message: "logged out".to_string(),
    }))
}

/// `GET /auth/me`: the authenticated user's profile.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserInfoResponse>> {
    let u = state.auth.get_user(&user.user_id).await?;
    Ok(Json(UserInfoResponse {
        id: u.id,
        username: u.username,
        name: u.display_name,
    }))
}
