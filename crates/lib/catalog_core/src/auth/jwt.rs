//! JWT token generation and verification.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::Deserialize;
use tracing::{info, warn};

use super::AuthError;
use crate::models::auth::{IssuedToken, TokenClaims, TokenKind, timestamp_to_datetime};
use crate::uuid::new_token_id;

/// Environment variable holding the signing secret.
pub const JWT_SECRET_ENV: &str = "CATALOG_JWT_SECRET";

/// Signs and verifies HS256 tokens with a single shared secret.
///
/// Decoding checks signature and structure only. Expiry, token kind and
/// revocation are the [`TokenManager`](super::manager::TokenManager)'s job.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for the given secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue an access token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, TokenKind::Access, ttl, Utc::now())
    }

    /// Issue a token of the given kind with an explicit issue time.
    pub fn issue_at(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let claims = TokenClaims {
            jti: new_token_id(),
            sub: subject.to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            pair_jti: None,
            pair_exp: None,
        };
        self.sign(claims)
    }

    /// Issue a refresh token bound to the access token minted in the same pair.
    pub fn issue_refresh_at(
        &self,
        subject: &str,
        ttl: Duration,
        access: &TokenClaims,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let claims = TokenClaims {
            jti: new_token_id(),
            sub: subject.to_string(),
            kind: TokenKind::Refresh,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            pair_jti: Some(access.jti.clone()),
            pair_exp: Some(access.exp),
        };
        self.sign(claims)
    }

    fn sign(&self, claims: TokenClaims) -> Result<IssuedToken, AuthError> {
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))?;
        Ok(IssuedToken { token, claims })
    }

    /// Verify the signature and decode the claims. Does not check expiry.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(classify_decode_error)?;
        if data.claims.exp == 0 {
            return Err(AuthError::ClaimsMissing("exp".into()));
        }
        Ok(data.claims)
    }
}

fn classify_decode_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::MissingRequiredClaim(claim) => AuthError::ClaimsMissing(claim.clone()),
        _ => AuthError::Malformed(e.to_string()),
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT **without verifying its signature**.
///
/// Only for deciding whether to refresh proactively on the client, which does
/// not hold the signing key. The server stays the sole authority on validity.
pub fn peek_expiry(token: &str) -> Result<DateTime<Utc>, AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::Malformed(format!(
            "expected 3 segments, got {}",
            segments.len()
        )));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|e| AuthError::Malformed(format!("payload encoding: {e}")))?;
    let claim: ExpiryClaim = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::Malformed(format!("payload json: {e}")))?;

    match claim.exp {
        Some(exp) if exp > 0 => Ok(timestamp_to_datetime(exp)),
        _ => Err(AuthError::ClaimsMissing("exp".into())),
    }
}

/// Resolve the signing secret: env var `CATALOG_JWT_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    resolve_jwt_secret_from(std::env::var(JWT_SECRET_ENV).ok(), &jwt_secret_path())
}

/// Resolve the secret from an explicit env value and secret file location.
///
/// Generates and persists a new secret when neither is usable.
pub fn resolve_jwt_secret_from(env_value: Option<String>, secret_path: &Path) -> String {
    if let Some(secret) = env_value
        && !secret.is_empty()
    {
        return secret;
    }
    if let Ok(existing) = std::fs::read_to_string(secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    match persist_secret(secret_path, &secret) {
        Ok(()) => info!(path = %secret_path.display(), "generated new JWT secret"),
        Err(e) => warn!(
            path = %secret_path.display(),
            error = %e,
            "could not persist JWT secret; tokens will not survive a restart"
        ),
    }
    secret
}

fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(secret.as_bytes())
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("catalog")
        .join("jwt-secret")
}
