//! User store business logic: signup validation, password hashing, and
//! refresh-token bookkeeping.

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use super::models::{SignupRequest, User};
use super::repository::UserRepository;

/// User store errors.
#[derive(Debug, Error)]
pub enum UserError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Email is already registered.
    #[error("Email already exists")]
    EmailTaken,

    /// No record matches the lookup.
    #[error("No user with that email")]
    NotFound,

    /// Storage or hashing failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Service for user store operations.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Create a new user with validation.
    ///
    /// Returns the stored record, hash included; callers strip it before
    /// exposing the record.
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: SignupRequest) -> Result<User, UserError> {
        let name = required_field(request.name, "name")?;
        let email = required_field(request.email, "email")?;
        let password = required_field(request.password, "password")?;
        let password_confirm = required_field(request.password_confirm, "passwordConfirm")?;

        if !is_valid_email(&email) {
            return Err(UserError::Validation("Invalid email".to_string()));
        }
        if password != password_confirm {
            return Err(UserError::Validation("Passwords do not match".to_string()));
        }

        if !self.repo.is_email_available(&email).await? {
            return Err(UserError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash: hash_password(&password)?,
            role: request.role.unwrap_or_else(|| "user".to_string()),
            active: true,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            refresh_token: None,
        };

        self.repo.insert(&user).await?;
        info!(user_id = %user.id, "Created new user");

        Ok(user)
    }

    /// Look up a user by email.
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self.repo.find_by_email(email).await?)
    }

    /// Load every record in insertion order.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.repo.load_all().await?)
    }

    /// Find the record whose stored refresh token equals `token`.
    ///
    /// The stored value is the primary authority for refresh: this match
    /// happens before any signature verification.
    #[instrument(skip(self, token))]
    pub async fn find_by_refresh_token(&self, token: &str) -> Result<Option<User>, UserError> {
        let users = self.repo.load_all().await?;
        Ok(users
            .into_iter()
            .find(|u| u.refresh_token.as_deref() == Some(token)))
    }

    /// Upsert a single record by id.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn save(&self, user: &User) -> Result<(), UserError> {
        Ok(self.repo.save(user).await?)
    }

    /// Atomically replace the entire record set.
    #[instrument(skip(self, users))]
    pub async fn replace_all(&self, users: &[User]) -> Result<(), UserError> {
        Ok(self.repo.replace_all(users).await?)
    }

    /// Verify a plaintext candidate against a stored hash.
    pub fn verify_password(&self, candidate: &str, hash: &str) -> Result<bool, UserError> {
        Ok(verify_password(candidate, hash)?)
    }
}

fn required_field(value: Option<String>, field: &str) -> Result<String, UserError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(UserError::Validation(format!("All fields required: missing {field}"))),
    }
}

/// Basic email syntax check: one `@`, non-empty local part, dotted domain.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    !parts[0].is_empty() && parts[1].contains('.') && !parts[1].starts_with('.')
}

/// Hash a password with bcrypt at the standard cost factor.
fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))
}

/// Verify a password against a bcrypt hash (constant-time comparison in the
/// library).
fn verify_password(password: &str, hash: &str) -> Result<bool, anyhow::Error> {
    bcrypt::verify(password, hash).map_err(|e| anyhow::anyhow!("Failed to verify password: {e}"))
}
