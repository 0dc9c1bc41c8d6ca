//! End-to-end tests for the signup, login, refresh, and logout flow.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use authgate::auth::{Claims, TokenIssuer, TokenKind};

mod common;
use common::{ACCESS_SECRET, REFRESH_SECRET, test_app};

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, HeaderMap, Value) {
    send(app, Method::POST, uri, Some(body), None).await
}

fn signup_body(name: &str, email: &str, password: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "password": password,
        "passwordConfirm": password,
    })
}

async fn signup(app: &Router, name: &str, email: &str, password: &str) -> Value {
    let (status, _, body) = post(app, "/api/v1/auth/signup", signup_body(name, email, password)).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

/// Extract the jwt cookie value (without attributes) from a Set-Cookie header.
fn jwt_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::SET_COOKIE)?.to_str().ok()?;
    let (name_value, _) = raw.split_once(';')?;
    let (name, value) = name_value.split_once('=')?;
    (name == "jwt").then(|| value.to_string())
}

fn decode_access(token: &str) -> Claims {
    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap()
    .claims
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let (status, _, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = test_app().await;

    let (status, _, body) = send(&app, Method::GET, "/api/v1/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Can't find /api/v1/nope on this server.");
}

#[tokio::test]
async fn test_signup_returns_sanitized_user() {
    let app = test_app().await;

    let (status, _, body) = post(
        &app,
        "/api/v1/auth/signup",
        signup_body("Ann", "ann@example.com", "hunter22"),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["name"], "Ann");
    assert_eq!(body["data"]["email"], "ann@example.com");
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["active"], true);
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["createdAt"].is_string());
    // The hash must never leave the server.
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_malformed_json_body_gets_error_envelope() {
    let app = test_app().await;

    let request = Request::builder()
        .uri("/api/v1/auth/login")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "fail");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_gets_error_envelope() {
    let app = test_app().await;

    // Valid JSON but no Content-Type header.
    let request = Request::builder()
        .uri("/api/v1/auth/signup")
        .method(Method::POST)
        .body(Body::from(
            signup_body("Ann", "ann@example.com", "hunter22").to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "fail");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_signup_duplicate_email_rejected() {
    let app = test_app().await;
    signup(&app, "Ann", "ann@example.com", "hunter22").await;

    let (status, _, body) = post(
        &app,
        "/api/v1/auth/signup",
        signup_body("Imposter", "ann@example.com", "different1"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn test_signup_password_mismatch_rejected() {
    let app = test_app().await;

    let (status, _, body) = post(
        &app,
        "/api/v1/auth/signup",
        json!({
            "name": "Ann",
            "email": "ann@example.com",
            "password": "hunter22",
            "passwordConfirm": "hunter23",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_signup_missing_field_rejected() {
    let app = test_app().await;

    let (status, _, body) = post(
        &app,
        "/api/v1/auth/signup",
        json!({ "email": "ann@example.com", "password": "hunter22" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_signup_malformed_email_rejected() {
    let app = test_app().await;

    let (status, _, body) = post(
        &app,
        "/api/v1/auth/signup",
        signup_body("Ann", "not-an-email", "hunter22"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_login_sets_cookie_and_returns_access_token() {
    let app = test_app().await;
    let created = signup(&app, "Ann", "ann@example.com", "hunter22").await;
    let user_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, headers, body) = post(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "ann@example.com", "password": "hunter22" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["message"], "Welcome back, Ann");

    let access_token = body["data"]["accessToken"].as_str().unwrap();
    let claims = decode_access(access_token);
    assert_eq!(claims.sub, user_id);

    let raw_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert!(raw_cookie.starts_with("jwt="));
    assert!(raw_cookie.contains("HttpOnly"));
    assert!(raw_cookie.contains("SameSite=Strict"));
    assert!(raw_cookie.contains("Max-Age=86400"));
    // Test app runs in development mode, so the cookie stays non-Secure.
    assert!(!raw_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = test_app().await;
    signup(&app, "Ann", "ann@example.com", "hunter22").await;

    let (status, _, body) = post(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "ann@example.com", "password": "wrong-pass" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Incorrect email or password");
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = test_app().await;

    let (status, _, body) = post(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "ghost@example.com", "password": "whatever1" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "No user with that email");
}

#[tokio::test]
async fn test_login_missing_credentials() {
    let app = test_app().await;

    let (status, _, body) = post(&app, "/api/v1/auth/login", json!({ "email": "a@b.com" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Email and password required");
}

#[tokio::test]
async fn test_refresh_mints_new_access_token() {
    let app = test_app().await;
    let created = signup(&app, "Ann", "ann@example.com", "hunter22").await;
    let user_id = created["data"]["id"].as_str().unwrap().to_string();

    let (_, headers, _) = post(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "ann@example.com", "password": "hunter22" }),
    )
    .await;
    let refresh = jwt_cookie(&headers).unwrap();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(&format!("jwt={refresh}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let new_access = body["data"]["accessToken"].as_str().unwrap();
    assert_eq!(decode_access(new_access).sub, user_id);
    // The refresh endpoint never hands back the long-lived token.
    assert_ne!(new_access, refresh);
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let app = test_app().await;

    let (status, _, body) = send(&app, Method::POST, "/api/v1/auth/refresh", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "No refresh token");
}

#[tokio::test]
async fn test_refresh_with_unmatched_token() {
    let app = test_app().await;
    signup(&app, "Ann", "ann@example.com", "hunter22").await;

    // Well-formed and correctly signed, but never stored for any user.
    let issuer = TokenIssuer::new(ACCESS_SECRET, REFRESH_SECRET);
    let stray = issuer.issue("nobody", TokenKind::Refresh).unwrap();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(&format!("jwt={stray}")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_login_invalidates_previous_refresh_token() {
    let app = test_app().await;
    signup(&app, "Ann", "ann@example.com", "hunter22").await;

    let credentials = json!({ "email": "ann@example.com", "password": "hunter22" });
    let (_, first_headers, _) = post(&app, "/api/v1/auth/login", credentials.clone()).await;
    let first_refresh = jwt_cookie(&first_headers).unwrap();

    // Tokens embed an issued-at timestamp with second precision; wait so the
    // second login produces a distinct token.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let (_, second_headers, _) = post(&app, "/api/v1/auth/login", credentials).await;
    let second_refresh = jwt_cookie(&second_headers).unwrap();
    assert_ne!(first_refresh, second_refresh);

    // Only the latest stored token continues to refresh.
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(&format!("jwt={first_refresh}")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(&format!("jwt={second_refresh}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = test_app().await;

    let (status, headers, body) = send(&app, Method::POST, "/api/v1/auth/logout", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Logged out successfully");

    let raw_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert!(raw_cookie.starts_with("jwt=;"));
    assert!(raw_cookie.contains("Max-Age=0"));
}

/// Logout is client-side only: a retained cookie keeps refreshing until it
/// expires or the next login replaces the stored token.
#[tokio::test]
async fn test_refresh_still_works_after_logout() {
    let app = test_app().await;
    signup(&app, "Ann", "ann@example.com", "hunter22").await;

    let (_, headers, _) = post(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "ann@example.com", "password": "hunter22" }),
    )
    .await;
    let refresh = jwt_cookie(&headers).unwrap();

    let (status, _, _) = send(&app, Method::POST, "/api/v1/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(&format!("jwt={refresh}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["accessToken"].is_string());
}

/// Full session lifecycle against a single app instance.
#[tokio::test]
async fn test_full_session_flow() {
    let app = test_app().await;

    let created = signup(&app, "Ann", "ann@example.com", "hunter22").await;
    let user_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, headers, body) = post(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "ann@example.com", "password": "hunter22" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let refresh = jwt_cookie(&headers).unwrap();
    assert_eq!(
        decode_access(body["data"]["accessToken"].as_str().unwrap()).sub,
        user_id
    );

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(&format!("jwt={refresh}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        decode_access(body["data"]["accessToken"].as_str().unwrap()).sub,
        user_id
    );

    let (status, headers, _) = send(&app, Method::POST, "/api/v1/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(jwt_cookie(&headers).unwrap().is_empty());
}
