//! HTTP client for the auth API.
//!
//! Every authenticated call first makes sure the stored access token has at
//! least `skew` left to live, refreshing it (once) when it does not.

use std::time::Duration;

use catalog_core::auth::jwt::peek_expiry;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::credentials::{CredentialStore, Credentials};
use crate::error::{ClientError, Result};
use crate::models::{
    ErrorBody, LOGIN_PATH, LOGOUT_PATH, LoginRequest, LogoutRequest, ME_PATH, REFRESH_PATH,
    RefreshRequest, TokenResponse, UserInfo,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default refresh margin before access-token expiry, in seconds.
pub const DEFAULT_SKEW_SECS: i64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub skew: chrono::Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            skew: chrono::Duration::seconds(DEFAULT_SKEW_SECS),
        }
    }
}

/// True when the stored access token should be refreshed before use.
///
/// An unknown expiry is read from the token itself; a token that cannot be
/// read is treated as stale.
pub fn needs_refresh(credentials: &Credentials, now: DateTime<Utc>, skew: chrono::Duration) -> bool {
    if credentials.access_token.is_empty() {
        return true;
    }
    let expiry = match credentials.access_token_expiry {
        Some(expiry) => expiry,
        None => match peek_expiry(&credentials.access_token) {
            Ok(expiry) => expiry,
            Err(e) => {
                debug!("cannot read access token expiry: {e}");
                return true;
            }
        },
    };
    expiry - now < skew
}

/// Validate a user-supplied server URL and strip any trailing slash.
pub fn normalize_server_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim()).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl(format!(
            "{raw}: scheme must be http or https"
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ClientError::InvalidUrl(format!("{raw}: missing host")));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Who the stored credentials belong to.
#[derive(Debug, Clone)]
pub struct Identity {
    pub server_url: String,
    pub user: UserInfo,
}

/// Result of [`AuthClient::logout_and_forget`]. Local credentials are gone
/// either way; `warning` says why the server did not confirm.
#[derive(Debug, Default)]
pub struct LogoutOutcome {
    pub server_url: Option<String>,
    pub warning: Option<String>,
}

impl LogoutOutcome {
    pub fn acknowledged(&self) -> bool {
        self.warning.is_none()
    }
}

pub struct AuthClient {
    http: Client,
    store: CredentialStore,
    config: ClientConfig,
}

impl AuthClient {
    pub fn new(store: CredentialStore, config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Unreachable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            store,
            config,
        })
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Authenticate and persist the resulting credentials.
    pub async fn login_and_persist(
        &self,
        server_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Credentials> {
        let server_url = normalize_server_url(server_url)?;
        let tokens: TokenResponse = self
            .post_json(&server_url, LOGIN_PATH, &LoginRequest { username, password })
            .await?;
        let credentials = credentials_from(server_url, tokens);
        self.store.save(&credentials)?;
        debug!("logged in to {}", credentials.server_url);
        Ok(credentials)
    }

    pub async fn ensure_fresh_access_token(&self, credentials: Credentials) -> Result<Credentials> {
        self.ensure_fresh_access_token_at(credentials, Utc::now()).await
    }

    /// Refresh the access token if it is within `skew` of expiry.
    pub async fn ensure_fresh_access_token_at(
        &self,
        credentials: Credentials,
        now: DateTime<Utc>,
    ) -> Result<Credentials> {
        if !needs_refresh(&credentials, now, self.config.skew) {
            return Ok(credentials);
        }
        self.refresh(&credentials).await
    }

    /// Rotate the token pair and persist the result. One attempt, no retry.
    pub async fn refresh(&self, credentials: &Credentials) -> Result<Credentials> {
        let tokens: TokenResponse = self
            .post_json(
                &credentials.server_url,
                REFRESH_PATH,
                &RefreshRequest {
                    refresh_token: &credentials.refresh_token,
                },
            )
            .await?;
        let updated = credentials_from(credentials.server_url.clone(), tokens);
        self.store.save(&updated)?;
        debug!("access token refreshed");
        Ok(updated)
    }

    /// The profile of the logged-in user.
    pub async fn whoami(&self) -> Result<Identity> {
        let credentials = self.store.load()?;
        let credentials = self.ensure_fresh_access_token(credentials).await?;

        let response = self
            .http
            .get(endpoint(&credentials.server_url, ME_PATH))
            .bearer_auth(&credentials.access_token)
            .send()
            .await?;
        let user: UserInfo = decode(response).await?;

        Ok(Identity {
            server_url: credentials.server_url,
            user,
        })
    }

    /// Tell the server to end the session, then remove local credentials no
    /// matter what the server said.
    pub async fn logout_and_forget(&self) -> Result<LogoutOutcome> {
        let credentials = match self.store.load() {
            Ok(credentials) => credentials,
            Err(ClientError::NotLoggedIn) => {
                // An incomplete file still holds tokens; remove it anyway.
                self.store.delete()?;
                return Err(ClientError::NotLoggedIn);
            }
            Err(e) => {
                warn!("discarding unreadable credentials: {e}");
                self.store.delete()?;
                return Ok(LogoutOutcome {
                    server_url: None,
                    warning: Some(e.to_string()),
                });
            }
        };

        let server_url = credentials.server_url.clone();
        let warning = match self.remote_logout(credentials).await {
            Ok(()) => None,
            Err(e) => {
                warn!("server logout failed: {e}");
                Some(e.to_string())
            }
        };

        self.store.delete()?;
        Ok(LogoutOutcome {
            server_url: Some(server_url),
            warning,
        })
    }

    async fn remote_logout(&self, credentials: Credentials) -> Result<()> {
        let credentials = self.ensure_fresh_access_token(credentials).await?;
        let response = self
            .http
            .post(endpoint(&credentials.server_url, LOGOUT_PATH))
            .bearer_auth(&credentials.access_token)
            .json(&LogoutRequest {
                refresh_token: &credentials.refresh_token,
            })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        server_url: &str,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .post(endpoint(server_url, path))
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

fn endpoint(server_url: &str, path: &str) -> String {
    format!("{}{path}", server_url.trim_end_matches('/'))
}

fn credentials_from(server_url: String, tokens: TokenResponse) -> Credentials {
    let access_token_expiry = peek_expiry(&tokens.access_token).ok();
    Credentials {
        server_url,
        refresh_token: tokens.refresh_token,
        access_token: tokens.access_token,
        access_token_expiry,
    }
}

/// Turn a non-2xx response into a typed error.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

    if status == reqwest::StatusCode::UNAUTHORIZED {
        Err(ClientError::Unauthorized(message))
    } else {
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    Ok(check(response).await?.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::auth::jwt::TokenCodec;
    use catalog_core::models::auth::TokenKind;

    fn creds(access_token: &str, expiry: Option<DateTime<Utc>>) -> Credentials {
        Credentials {
            server_url: "http://localhost:8080".into(),
            refresh_token: "refresh".into(),
            access_token: access_token.into(),
            access_token_expiry: expiry,
        }
    }

    fn skew() -> chrono::Duration {
        chrono::Duration::seconds(DEFAULT_SKEW_SECS)
    }

    #[test]
    fn skew_boundary() {
        let now = Utc::now();
        let just_inside = creds("t", Some(now + skew() - chrono::Duration::seconds(1)));
        let just_outside = creds("t", Some(now + skew() + chrono::Duration::seconds(1)));

        assert!(needs_refresh(&just_inside, now, skew()));
        assert!(!needs_refresh(&just_outside, now, skew()));
    }

    #[test]
    fn empty_access_token_always_refreshes() {
        let far = Utc::now() + chrono::Duration::hours(1);
        assert!(needs_refresh(&creds("", Some(far)), Utc::now(), skew()));
    }

    #[test]
    fn unknown_expiry_is_read_from_the_token() {
        let codec = TokenCodec::new(b"any-secret");
        let now = Utc::now();

        let short = codec
            .issue_at("u", TokenKind::Access, chrono::Duration::seconds(10), now)
            .unwrap();
        assert!(needs_refresh(&creds(&short.token, None), now, skew()));

        let long = codec
            .issue_at("u", TokenKind::Access, chrono::Duration::hours(1), now)
            .unwrap();
        assert!(!needs_refresh(&creds(&long.token, None), now, skew()));
    }

    #[test]
    fn unreadable_token_with_unknown_expiry_refreshes() {
        assert!(needs_refresh(&creds("opaque", None), Utc::now(), skew()));
    }

    #[test]
    fn server_urls_are_validated() {
        assert_eq!(
            normalize_server_url("http://localhost:8080/").unwrap(),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize_server_url("https://catalog.example.com").unwrap(),
            "https://catalog.example.com"
        );
        assert!(normalize_server_url("ftp://example.com").is_err());
        assert!(normalize_server_url("localhost:8080").is_err());
        assert!(normalize_server_url("not a url").is_err());
    }

    #[test]
    fn endpoints_join_cleanly() {
        assert_eq!(
            endpoint("http://h:1/", ME_PATH),
            "http://h:1/api/v1/auth/me"
        );
    }
}
