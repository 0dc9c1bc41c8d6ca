//! User repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::User;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, active, created_at, refresh_token";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user record.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn insert(&self, user: &User) -> Result<()> {
        debug!("Inserting user: {} ({})", user.email, user.id);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, active, created_at, refresh_token)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.active)
        .bind(&user.created_at)
        .bind(&user.refresh_token)
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        Ok(())
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        Ok(user)
    }

    /// Get a user by email (exact match).
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        Ok(user)
    }

    /// Load every record in insertion order. Empty when no data exists yet.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to load users")?;

        Ok(users)
    }

    /// Atomically replace the entire record set.
    ///
    /// Runs in one transaction so a concurrent reader never observes a
    /// partially written set.
    #[instrument(skip(self, users), fields(count = users.len()))]
    pub async fn replace_all(&self, users: &[User]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM users")
            .execute(&mut *tx)
            .await
            .context("Failed to clear users")?;

        for user in users {
            sqlx::query(
                r#"
                INSERT INTO users (id, name, email, password_hash, role, active, created_at, refresh_token)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.role)
            .bind(user.active)
            .bind(&user.created_at)
            .bind(&user.refresh_token)
            .execute(&mut *tx)
            .await
            .context("Failed to insert user during replace")?;
        }

        tx.commit().await.context("Failed to commit replace")?;
        Ok(())
    }

    /// Upsert a single record by id: update in place if found, else append.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn save(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, password_hash = ?, role = ?, active = ?,
                created_at = ?, refresh_token = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.active)
        .bind(&user.created_at)
        .bind(&user.refresh_token)
        .bind(&user.id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?;

        if result.rows_affected() == 0 {
            self.insert(user).await?;
        }

        Ok(())
    }

    /// Check whether an email is still available.
    #[instrument(skip(self))]
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check email availability")?;

        Ok(count.0 == 0)
    }
}
