//! Integration tests: build the router around a static directory and drive
//! the auth endpoints end to end.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use catalog_api::{AppState, config::ApiConfig, routes};
use catalog_core::auth::directory::StaticUserDirectory;
use catalog_core::auth::jwt::TokenCodec;
use catalog_core::auth::password;
use catalog_core::models::auth::TokenKind;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

fn app() -> (Router, AppState) {
    let hash = password::hash_password("correct", password::MIN_COST).unwrap();
    let directory = StaticUserDirectory::new()
        .with_bootstrap_admin("admin", hash)
        .unwrap();
    let state = AppState::new(ApiConfig::new(SECRET), Arc::new(directory));
    (catalog_api::router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("parse JSON")
    };
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn login(app: &Router) -> (String, String) {
    let (status, json) = send(
        app,
        post_json(
            routes::POST_AUTH_LOGIN,
            json!({"username": "admin", "password": "correct"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {json}");
    (
        json["access_token"].as_str().unwrap().to_string(),
        json["refresh_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn healthz_is_ok() {
    let (app, _) = app();
    let req = Request::builder()
        .uri(routes::GET_HEALTHZ)
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "ok");
}

#[tokio::test]
async fn login_returns_a_bearer_pair() {
    let (app, state) = app();
    let (status, json) = send(
        &app,
        post_json(
            routes::POST_AUTH_LOGIN,
            json!({"username": "admin", "password": "correct"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["token_type"], "Bearer");
    assert!(!json["access_token"].as_str().unwrap().is_empty());
    assert!(!json["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(json["expires_in"], 15 * 60);

    let claims = state
        .auth
        .tokens()
        .verify(json["access_token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "admin");
}

#[tokio::test]
async fn wrong_password_is_401_without_side_effects() {
    let (app, state) = app();
    let (status, json) = send(
        &app,
        post_json(
            routes::POST_AUTH_LOGIN,
            json!({"username": "admin", "password": "wrong"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "invalid credentials");
    assert!(json.get("access_token").is_none());
    assert!(state.blacklist().is_empty());

    // Unknown users get the identical answer.
    let (status, unknown) = send(
        &app,
        post_json(
            routes::POST_AUTH_LOGIN,
            json!({"username": "nobody", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, json);
}

#[tokio::test]
async fn malformed_login_body_is_400() {
    let (app, _) = app();
    let (status, json) = send(
        &app,
        post_json(routes::POST_AUTH_LOGIN, json!({"username": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "invalid payload");
}

#[tokio::test]
async fn me_requires_a_token() {
    let (app, _) = app();
    let req = Request::builder()
        .uri(routes::GET_AUTH_ME)
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "missing token");
}

#[tokio::test]
async fn me_returns_the_user() {
    let (app, _) = app();
    let (access, _) = login(&app).await;

    let (status, json) = send(&app, authed("GET", routes::GET_AUTH_ME, &access, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"id": "admin", "username": "admin", "name": "Administrator"})
    );
}

#[tokio::test]
async fn expired_and_revoked_tokens_look_the_same() {
    let (app, _) = app();

    let expired = TokenCodec::new(SECRET.as_bytes())
        .issue_at(
            "admin",
            TokenKind::Access,
            Duration::minutes(1),
            Utc::now() - Duration::hours(1),
        )
        .unwrap();
    let (status, expired_body) = send(
        &app,
        authed("GET", routes::GET_AUTH_ME, &expired.token, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (access, _) = login(&app).await;
    let (status, _) = send(&app, authed("POST", routes::POST_AUTH_LOGOUT, &access, None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, revoked_body) =
        send(&app, authed("GET", routes::GET_AUTH_ME, &access, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, garbage_body) =
        send(&app, authed("GET", routes::GET_AUTH_ME, "not.a.token", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(expired_body, revoked_body);
    assert_eq!(revoked_body, garbage_body);
    assert_eq!(revoked_body["message"], "invalid or expired token");
}

#[tokio::test]
async fn refresh_rotates_and_invalidates_the_old_pair() {
    let (app, _) = app();
    let (access, refresh) = login(&app).await;

    let (status, rotated) = send(
        &app,
        post_json(routes::POST_AUTH_REFRESH, json!({"refresh_token": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_access = rotated["access_token"].as_str().unwrap();
    assert_ne!(rotated["refresh_token"].as_str().unwrap(), refresh);

    // Replaying the consumed refresh token fails.
    let (status, json) = send(
        &app,
        post_json(routes::POST_AUTH_REFRESH, json!({"refresh_token": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "invalid refresh token");

    // The old access token stopped working at rotation time.
    let (status, _) = send(&app, authed("GET", routes::GET_AUTH_ME, &access, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The rotated token still identifies the original user.
    let (status, me) = send(&app, authed("GET", routes::GET_AUTH_ME, new_access, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "admin");
}

#[tokio::test]
async fn refresh_with_an_access_token_is_rejected() {
    let (app, _) = app();
    let (access, _) = login(&app).await;
    let (status, _) = send(
        &app,
        post_json(routes::POST_AUTH_REFRESH, json!({"refresh_token": access})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_with_refresh_token_ends_the_session() {
    let (app, state) = app();
    let (access, refresh) = login(&app).await;

    let (status, json) = send(
        &app,
        authed(
            "POST",
            routes::POST_AUTH_LOGOUT,
            &access,
            Some(json!({"refresh_token": refresh})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "logged out");
    assert_eq!(state.blacklist().len(), 2);

    let (status, _) = send(
        &app,
        post_json(routes::POST_AUTH_REFRESH, json!({"refresh_token": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_requires_a_token() {
    let (app, _) = app();
    let req = Request::builder()
        .method("POST")
        .uri(routes::POST_AUTH_LOGOUT)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
