//! Token claims and kinds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which secret and expiry policy applies to a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived credential authorizing API calls.
    Access,
    /// Long-lived credential used solely to mint new access tokens.
    Refresh,
}

impl TokenKind {
    /// Token lifetime for this kind.
    pub fn lifetime(self) -> Duration {
        match self {
            TokenKind::Access => Duration::from_secs(5 * 60),
            TokenKind::Refresh => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the token is bound to.
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}
