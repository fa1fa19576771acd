//! Authentication domain models.
//!
//! These are internal domain models, distinct from the wire models in
//! `catalog_api::models` (which follow the HTTP contract's field names).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain user, as resolved by a [`UserDirectory`](crate::auth::directory::UserDirectory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
}

/// User with password hash (for internal auth flows).
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived bearer token presented on every authenticated request.
    Access,
    /// Long-lived token presented only to the refresh endpoint.
    Refresh,
}

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Token identity, used as the blacklist key.
    pub jti: String,
    /// Subject (user ID).
    pub sub: String,
    /// Token kind.
    #[serde(rename = "typ")]
    pub kind: TokenKind,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp). Zero when the claim was absent.
    #[serde(default)]
    pub exp: i64,
    /// On refresh tokens: `jti` of the access token issued alongside it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_jti: Option<String>,
    /// On refresh tokens: `exp` of the access token issued alongside it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_exp: Option<i64>,
}

impl TokenClaims {
    /// Absolute expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.exp)
    }

    /// True once `now` has reached the expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Configured lifetime of the token in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }
}

/// A freshly signed token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Access + refresh tokens, always issued and rotated together.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Convert unix seconds to a UTC timestamp, clamping out-of-range values.
pub(crate) fn timestamp_to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(if secs < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
