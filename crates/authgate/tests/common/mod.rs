//! Test utilities and common setup.

use axum::Router;

use authgate::api::{AppState, create_router};
use authgate::auth::TokenIssuer;
use authgate::db::Database;
use authgate::user::{UserRepository, UserService};

pub const ACCESS_SECRET: &str = "test-access-secret-for-integration-tests";
pub const REFRESH_SECRET: &str = "test-refresh-secret-for-integration-tests";

/// Create a test application over an in-memory database.
pub async fn test_app() -> Router {
    let db = Database::in_memory().await.unwrap();

    let user_repo = UserRepository::new(db.pool().clone());
    let user_service = UserService::new(user_repo);

    let issuer = TokenIssuer::new(ACCESS_SECRET, REFRESH_SECRET);

    let state = AppState::new(
        user_service,
        issuer,
        false,
        vec!["http://localhost:3000".to_string()],
        "/api/v1".to_string(),
    );
    create_router(state)
}
