//! Authentication service. Owns the login/refresh/logout transaction
//! boundaries, delegating token work to `catalog_core::auth::manager`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use catalog_core::auth::AuthError;
use catalog_core::auth::directory::UserDirectory;
use catalog_core::auth::manager::TokenManager;
use catalog_core::auth::password;
use catalog_core::models::auth::{TokenPair, User};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Login, refresh, logout and user lookup.
#[derive(Clone)]
pub struct AuthService {
    directory: Arc<dyn UserDirectory>,
    tokens: Arc<TokenManager>,
    lookup_timeout: Duration,
}

impl AuthService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        tokens: Arc<TokenManager>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            tokens,
            lookup_timeout,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Authenticate with username + password.
    ///
    /// Unknown user and wrong password are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let record = self
            .bounded(self.directory.find_by_username(username))
            .await?;

        let Some(record) = record else {
            password::dummy_verify(password);
            info!(username, "login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = password::verify_password(password, &record.password_hash)
            .unwrap_or_else(|e| {
                warn!(username, error = %e, "stored password hash is unusable");
                false
            });
        if !matches {
            info!(username, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.tokens.issue_initial(&record.user)?;
        info!(username, user_id = %record.user.id, "login succeeded");
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let pair = self.tokens.rotate(refresh_token)?;
        debug!(user_id = %pair.access.claims.sub, "tokens refreshed");
        Ok(pair)
    }

    /// Revoke the access token that authenticated the request and, when
    /// supplied, the session's refresh token. Idempotent.
    pub fn logout(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), AuthError> {
        let claims = self.tokens.revoke(access_token)?;

        if let Some(refresh_token) = refresh_token
            && let Err(e) = self
                .tokens
                .revoke_refresh_at(refresh_token, &claims.sub, Utc::now())
        {
            debug!(user_id = %claims.sub, reason = %e, "ignoring refresh token on logout");
        }

        info!(user_id = %claims.sub, "logged out");
        Ok(())
    }

    /// Look up a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<User, AuthError> {
        self.bounded(self.directory.find_by_id(user_id))
            .await?
            .ok_or_else(|| AuthError::NotFound("user not found".into()))
    }

    /// Run a directory lookup under the configured timeout.
    async fn bounded<T>(
        &self,
        lookup: impl Future<Output = Result<T, AuthError>>,
    ) -> Result<T, AuthError> {
        tokio::time::timeout(self.lookup_timeout, lookup)
            .await
            .map_err(|_| AuthError::Unavailable("user directory lookup timed out".into()))?
    }
}
