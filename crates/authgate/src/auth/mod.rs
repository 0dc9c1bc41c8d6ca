//! Authentication module.
//!
//! Issues and verifies signed, time-limited access and refresh tokens bound
//! to a user id. The two kinds use independent secrets and lifetimes.

mod claims;
mod error;
mod issuer;

pub use claims::{Claims, TokenKind};
pub use error::AuthError;
pub use issuer::TokenIssuer;
