//! Authentication errors.

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No refresh token cookie on the request.
    #[error("No refresh token")]
    MissingToken,

    /// Bad signature or malformed token.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// Token verified but its subject does not match the stored record.
    #[error("Token verification failed")]
    TokenMismatch,

    /// Wrong email/password pair.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}
