//! Token issuance and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::warn;

use super::claims::{Claims, TokenKind};
use super::error::AuthError;

/// Encoding/decoding key pair derived from one HS256 secret.
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues and verifies signed tokens.
///
/// Access and refresh tokens are signed with independent secrets, so a token
/// of one kind never verifies as the other. Secrets are injected once at
/// construction; nothing reads ambient configuration per call.
pub struct TokenIssuer {
    access: KeyPair,
    refresh: KeyPair,
}

impl TokenIssuer {
    /// Create an issuer from the two configured secrets.
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access: KeyPair::from_secret(access_secret),
            refresh: KeyPair::from_secret(refresh_secret),
        }
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Issue a signed token bound to `subject` with the kind's lifetime.
    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + kind.lifetime().as_secs() as i64,
        };

        encode(&Header::default(), &claims, &self.keys(kind).encoding)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify signature and expiry against the kind-appropriate secret.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, &self.keys(kind).decoding, &validation).map_err(
            |e| {
                warn!(%kind, "Token validation failed: {e}");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            },
        )?;

        Ok(data.claims)
    }
}
