//! User data models.

use serde::{Deserialize, Serialize};

/// A persisted user record.
///
/// `password_hash` never leaves the process; outward-facing responses use
/// [`UserInfo`] instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub created_at: String,
    /// Raw value of the most recently issued refresh token, if any.
    /// Overwritten on every login; a single live session per user.
    pub refresh_token: Option<String>,
}

/// Sanitized user representation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub created_at: String,
    pub refresh_token: Option<String>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
            refresh_token: user.refresh_token,
        }
    }
}

/// Signup request body.
///
/// Fields are optional at the type level so that missing ones surface as a
/// validation error with a JSON body rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_strips_password_hash() {
        let user = User {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role: "user".to_string(),
            active: true,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            refresh_token: None,
        };

        let info: UserInfo = user.into();
        let json = serde_json::to_value(&info).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ann@x.com");
        assert_eq!(json["createdAt"], "2026-01-01T00:00:00Z");
        assert_eq!(json["refreshToken"], serde_json::Value::Null);
    }

    #[test]
    fn test_signup_request_accepts_camel_case() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"name":"Ann","email":"ann@x.com","password":"pw","passwordConfirm":"pw"}"#,
        )
        .unwrap();

        assert_eq!(req.password_confirm.as_deref(), Some("pw"));
        assert!(req.role.is_none());
    }
}
