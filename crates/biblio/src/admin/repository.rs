//! Administrator repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::Admin;

/// Repository for administrator database operations.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    /// Create a new administrator repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new administrator with a pre-hashed password.
    #[instrument(skip(self, password_hash))]
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<Admin> {
        debug!("Creating administrator: {}", username);

        let result = sqlx::query(
            r#"
            INSERT INTO admins (username, password_hash)
            VALUES (?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .context("Failed to insert administrator")?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("Administrator not found after creation"))
    }

    /// Get an administrator by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, username, password_hash, created_at, updated_at, last_login_at
            FROM admins
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch administrator")?;

        Ok(admin)
    }

    /// Get an administrator by username.
    #[instrument(skip(self))]
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, username, password_hash, created_at, updated_at, last_login_at
            FROM admins
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch administrator by username")?;

        Ok(admin)
    }

    /// Replace an administrator's password hash.
    #[instrument(skip(self, password_hash))]
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE admins SET password_hash = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update administrator password")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Administrator not found: {}", id));
        }

        Ok(())
    }

    /// Update last login timestamp.
    #[instrument(skip(self))]
    pub async fn update_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE admins SET last_login_at = datetime('now') WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update last login")?;

        Ok(())
    }

    /// Count administrator accounts.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count administrators")?;

        Ok(count.0)
    }
}
