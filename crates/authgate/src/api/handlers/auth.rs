//! Authentication handlers: signup, login, refresh, logout.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header::COOKIE, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::auth::{AuthError, TokenKind};
use crate::user::{SignupRequest, UserInfo};

use super::super::error::{ApiError, ApiResult};
use super::super::extract::Json;
use super::super::state::AppState;

/// Name of the refresh-token cookie.
const COOKIE_NAME: &str = "jwt";

/// Login request body.
///
/// Fields are optional at the type level so missing ones surface as a 400
/// with a JSON body rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Signup response.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub status: &'static str,
    pub data: UserInfo,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub data: LoginData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: String,
    pub message: String,
}

/// Refresh response.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub data: RefreshData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshData {
    pub access_token: String,
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Build the refresh-token cookie set on login.
///
/// HTTP-only and SameSite=Strict always; Secure only in production so that
/// plain-http local development keeps working. Max-Age matches the refresh
/// token lifetime.
fn refresh_cookie(token: &str, production: bool) -> String {
    let secure_flag = if production { " Secure;" } else { "" };
    format!(
        "{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict;{secure_flag} Max-Age={}",
        TokenKind::Refresh.lifetime().as_secs()
    )
}

/// Build the cookie that clears the refresh token (same attributes,
/// immediate expiry).
fn clear_cookie(production: bool) -> String {
    let secure_flag = if production { " Secure;" } else { "" };
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict;{secure_flag} Max-Age=0")
}

/// Extract a cookie value from a Cookie header.
fn token_from_cookie_header<'a>(cookie_header: &'a str, cookie_name: &str) -> Option<&'a str> {
    cookie_header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() == cookie_name {
            Some(value.trim())
        } else {
            None
        }
    })
}

fn refresh_token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|header| token_from_cookie_header(header, COOKIE_NAME))
}

/// Register a new user.
///
/// Responds 201 with the sanitized record; the password hash never appears
/// in the response.
#[instrument(skip(state, request))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.users.create(request).await?;

    info!(user_id = %user.id, email = %user.email, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            status: "success",
            data: user.into(),
        }),
    ))
}

/// Log in with email and password.
///
/// Issues a fresh access/refresh token pair, overwrites the stored refresh
/// token (single session per user), and sets the refresh cookie.
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (email, password) = match (request.email, request.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => return Err(ApiError::validation("Email and password required")),
    };

    let mut user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found("No user with that email"))?;

    if !state.users.verify_password(&password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let access_token = state.tokens.issue(&user.id, TokenKind::Access)?;
    let refresh_token = state.tokens.issue(&user.id, TokenKind::Refresh)?;

    user.refresh_token = Some(refresh_token.clone());
    state.users.save(&user).await?;

    info!(user_id = %user.id, "User logged in");

    let cookie = refresh_cookie(&refresh_token, state.production);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            status: "success",
            data: LoginData {
                access_token,
                message: format!("Welcome back, {}", user.name),
            },
        }),
    ))
}

/// Mint a new access token from the refresh cookie.
///
/// The stored refresh token is the primary authority: the presented cookie
/// value must match a record before the signature is even checked. The
/// refresh token itself is not rotated.
#[instrument(skip(state, headers))]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let presented = refresh_token_from_headers(&headers).ok_or(AuthError::MissingToken)?;

    let user = state
        .users
        .find_by_refresh_token(presented)
        .await?
        .ok_or_else(|| ApiError::forbidden("Invalid refresh token"))?;

    let claims = state.tokens.verify(presented, TokenKind::Refresh)?;
    if claims.sub != user.id {
        return Err(AuthError::TokenMismatch.into());
    }

    let access_token = state.tokens.issue(&user.id, TokenKind::Access)?;

    Ok(Json(RefreshResponse {
        status: "success",
        data: RefreshData { access_token },
    }))
}

/// Log out: clear the refresh cookie.
///
/// Client-side only. The stored refresh token is not revoked; a retained
/// cookie keeps refreshing until its natural expiry or the next login.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_cookie(state.production);

    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LogoutResponse {
            status: "success",
            message: "Logged out successfully",
        }),
    )
}
