//! Authentication middleware: Bearer token extraction and verification.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, INVALID_TOKEN_MESSAGE};

/// Identity injected into request extensions for downstream handlers.
///
/// The raw token is kept so logout revokes exactly the token that
/// authenticated the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub raw_token: String,
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies it,
/// and injects [`AuthenticatedUser`] into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("missing token".into()))?
        .to_string();

    let claims = state.auth.tokens().verify(&token).map_err(|e| {
        debug!(reason = %e, "bearer token rejected");
        AppError::Unauthorized(INVALID_TOKEN_MESSAGE.into())
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.sub,
        raw_token: token,
    });

    Ok(next.run(request).await)
}

/// The token of a well-formed `Bearer` authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
