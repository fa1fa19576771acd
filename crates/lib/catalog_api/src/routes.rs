//! Route paths.

/// `GET /healthz`
pub const GET_HEALTHZ: &str = "/healthz";
/// `POST /api/v1/auth/login`
pub const POST_AUTH_LOGIN: &str = "/api/v1/auth/login";
/// `POST /api/v1/auth/refresh`
pub const POST_AUTH_REFRESH: &str = "/api/v1/auth/refresh";
/// `POST /api/v1/auth/logout`
pub const POST_AUTH_LOGOUT: &str = "/api/v1/auth/logout";
/// `GET /api/v1/auth/me`
pub const GET_AUTH_ME: &str = "/api/v1/auth/me";
