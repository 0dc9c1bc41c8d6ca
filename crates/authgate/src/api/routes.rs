//! Router assembly and CORS configuration.

use axum::http::{HeaderValue, Method, Uri, header};
use axum::{Json, Router, http::StatusCode, routing::get, routing::post};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let prefix = state.api_prefix.trim_end_matches('/').to_string();

    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest(&format!("{prefix}/auth"), auth_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(trace_layer)
}

/// Catch-all for unknown routes.
async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "fail",
            "message": format!("Can't find {uri} on this server."),
        })),
    )
}

/// Build the CORS layer based on configuration.
///
/// Cookies cross origins, so credentials are allowed and origins must be
/// listed explicitly; a wildcard would be rejected by browsers. In
/// production with no configured origins, all cross-origin requests are
/// denied.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE];

    let mut origins: Vec<HeaderValue> = Vec::new();
    for origin in &state.allowed_origins {
        match origin.parse::<HeaderValue>() {
            Ok(value) => origins.push(value),
            Err(_) => tracing::warn!(%origin, "CORS: Ignoring invalid origin"),
        }
    }

    if origins.is_empty() {
        if state.production {
            tracing::warn!(
                "CORS: No origins configured in production mode, denying all cross-origin requests"
            );
            return CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static(
                "null",
            )));
        }
        tracing::warn!("CORS: No origins configured, using default localhost origins for dev mode");
        origins = vec![
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ];
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}
