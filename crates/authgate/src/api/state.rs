//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::user::UserService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User store.
    pub users: UserService,
    /// Token issuance and verification.
    pub tokens: Arc<TokenIssuer>,
    /// Whether the `Secure` cookie flag is set.
    pub production: bool,
    /// Allowed CORS origins.
    pub allowed_origins: Vec<String>,
    /// Prefix for all API routes.
    pub api_prefix: String,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        users: UserService,
        tokens: TokenIssuer,
        production: bool,
        allowed_origins: Vec<String>,
        api_prefix: String,
    ) -> Self {
        Self {
            users,
            tokens: Arc::new(tokens),
            production,
            allowed_origins,
            api_prefix,
        }
    }
}
