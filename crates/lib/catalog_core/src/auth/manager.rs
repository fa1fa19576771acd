//! Token manager: the single issuer of signed tokens and the single writer
//! of blacklist entries.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::AuthError;
use super::blacklist::TokenBlacklist;
use super::jwt::TokenCodec;
use crate::models::auth::{TokenClaims, TokenKind, TokenPair, User, timestamp_to_datetime};

/// Access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Lifetimes for the two halves of a token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtls {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh: Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
        }
    }
}

/// Issues, verifies, rotates and revokes token pairs.
///
/// Every time-dependent operation has an `*_at` variant taking an explicit
/// `now`; the plain variants use the wall clock.
#[derive(Clone)]
pub struct TokenManager {
    codec: TokenCodec,
    blacklist: Arc<TokenBlacklist>,
    ttls: TokenTtls,
}

impl TokenManager {
    pub fn new(codec: TokenCodec, blacklist: Arc<TokenBlacklist>, ttls: TokenTtls) -> Self {
        Self {
            codec,
            blacklist,
            ttls,
        }
    }

    /// The blacklist this manager writes to.
    pub fn blacklist(&self) -> &Arc<TokenBlacklist> {
        &self.blacklist
    }

    pub fn ttls(&self) -> TokenTtls {
        self.ttls
    }

    /// Issue the first pair for a user whose password has just been checked.
    pub fn issue_initial(&self, user: &User) -> Result<TokenPair, AuthError> {
        self.issue_initial_at(user, Utc::now())
    }

    pub fn issue_initial_at(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        self.issue_pair(&user.id, now)
    }

    fn issue_pair(&self, subject: &str, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        let access = self
            .codec
            .issue_at(subject, TokenKind::Access, self.ttls.access, now)?;
        let refresh = self
            .codec
            .issue_refresh_at(subject, self.ttls.refresh, &access.claims, now)?;
        Ok(TokenPair { access, refresh })
    }

    /// Verify an access token, returning its claims (`claims.sub` is the subject).
    pub fn verify(&self, access_token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(access_token, Utc::now())
    }

    pub fn verify_at(&self, access_token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        self.check(access_token, TokenKind::Access, now)
    }

    /// Decode, then kind, then expiry, then blacklist. Garbage is rejected
    /// before the blacklist is touched.
    fn check(&self, token: &str, kind: TokenKind, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let claims = self.codec.decode(token)?;
        if claims.kind != kind {
            return Err(AuthError::WrongTokenType);
        }
        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }
        if self.blacklist.contains(&claims.jti) {
            return Err(AuthError::Revoked);
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a brand-new pair.
    pub fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.rotate_at(refresh_token, Utc::now())
    }

    /// The new pair is minted before the old refresh token is consumed, so a
    /// signing failure leaves the old token usable. Consuming the old token is
    /// an atomic claim: of two concurrent rotations only one succeeds.
    pub fn rotate_at(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        let claims = self
            .check(refresh_token, TokenKind::Refresh, now)
            .map_err(|e| {
                debug!(reason = %e, "refresh token rejected");
                AuthError::InvalidRefreshToken
            })?;

        let pair = self.issue_pair(&claims.sub, now)?;

        if !self
            .blacklist
            .claim_at(claims.jti.clone(), claims.expires_at(), now)
        {
            debug!(jti = %claims.jti, "refresh token already consumed");
            return Err(AuthError::InvalidRefreshToken);
        }

        if let (Some(jti), Some(exp)) = (claims.pair_jti, claims.pair_exp)
            && exp > now.timestamp()
        {
            self.blacklist.add_at(jti, timestamp_to_datetime(exp), now);
        }

        debug!(sub = %claims.sub, old_jti = %claims.jti, new_jti = %pair.refresh.claims.jti, "rotated token pair");
        Ok(pair)
    }

    /// Blacklist an access token until its own expiry, returning its claims.
    ///
    /// Already expired or already revoked tokens succeed without a new entry.
    pub fn revoke(&self, access_token: &str) -> Result<TokenClaims, AuthError> {
        self.revoke_at(access_token, Utc::now())
    }

    pub fn revoke_at(&self, access_token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let claims = self.codec.decode(access_token)?;
        self.retire(&claims, now);
        Ok(claims)
    }

    /// Blacklist a refresh token on logout. It must belong to `subject`.
    pub fn revoke_refresh_at(
        &self,
        refresh_token: &str,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let claims = self.codec.decode(refresh_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::WrongTokenType);
        }
        if claims.sub != subject {
            return Err(AuthError::ValidationError(
                "refresh token belongs to another subject".into(),
            ));
        }
        self.retire(&claims, now);
        Ok(())
    }

    fn retire(&self, claims: &TokenClaims, now: DateTime<Utc>) {
        if claims.is_expired_at(now) {
            debug!(jti = %claims.jti, "token already expired, nothing to revoke");
            return;
        }
        self.blacklist
            .add_at(claims.jti.clone(), claims.expires_at(), now);
        debug!(jti = %claims.jti, kind = ?claims.kind, "token revoked");
    }
}
