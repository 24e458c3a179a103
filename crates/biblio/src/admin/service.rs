//! Administrator account service.
//!
//! Owns password hashing and credential verification on top of the
//! repository. Handlers and CLI commands go through this layer.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use super::models::Admin;
use super::repository::AdminRepository;

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

/// Service for administrator account management.
#[derive(Debug, Clone)]
pub struct AdminService {
    repo: AdminRepository,
}

impl AdminService {
    /// Create a new administrator service.
    pub fn new(repo: AdminRepository) -> Self {
        Self { repo }
    }

    /// Create an administrator account, hashing the password.
    #[instrument(skip(self, password))]
    pub async fn create_admin(&self, username: &str, password: &str) -> Result<Admin> {
        let username = username.trim();
        if username.len() < MIN_USERNAME_LEN {
            anyhow::bail!("Username must be at least {MIN_USERNAME_LEN} characters");
        }
        if password.len() < MIN_PASSWORD_LEN {
            anyhow::bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
        }

        if self.repo.get_by_username(username).await?.is_some() {
            anyhow::bail!("An administrator with that username already exists");
        }

        let password_hash =
            bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")?;

        let admin = self.repo.create(username, &password_hash).await?;
        info!(admin_id = admin.id, "Created administrator account");
        Ok(admin)
    }

    /// Verify a username/password pair.
    ///
    /// Returns None for both an unknown username and a wrong password, so
    /// callers cannot leak which of the two failed.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<Admin>> {
        let Some(admin) = self.repo.get_by_username(username).await? else {
            return Ok(None);
        };

        let matches = bcrypt::verify(password, &admin.password_hash).unwrap_or(false);
        Ok(matches.then_some(admin))
    }

    /// Replace an administrator's password.
    #[instrument(skip(self, new_password))]
    pub async fn change_password(&self, id: i64, new_password: &str) -> Result<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            anyhow::bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
        }

        let password_hash =
            bcrypt::hash(new_password, bcrypt::DEFAULT_COST).context("Failed to hash password")?;

        self.repo.update_password(id, &password_hash).await?;
        info!(admin_id = id, "Administrator password changed");
        Ok(())
    }

    /// Get an administrator by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Admin>> {
        self.repo.get_by_username(username).await
    }

    /// Record a successful login.
    pub async fn record_login(&self, id: i64) -> Result<()> {
        self.repo.update_last_login(id).await
    }

    /// Count administrator accounts.
    pub async fn count(&self) -> Result<i64> {
        self.repo.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_service() -> AdminService {
        let db = Database::in_memory().await.unwrap();
        AdminService::new(AdminRepository::new(db.pool().clone()))
    }

    #[tokio::test]
    async fn test_create_admin_hashes_password() {
        let service = setup_service().await;

        let admin = service.create_admin("admin", "password123").await.unwrap();
        assert_ne!(admin.password_hash, "password123");
        assert!(admin.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_create_admin_validates_input() {
        let service = setup_service().await;

        assert!(service.create_admin("ab", "password123").await.is_err());
        assert!(service.create_admin("admin", "short").await.is_err());
    }

    #[tokio::test]
    async fn test_create_admin_rejects_duplicates() {
        let service = setup_service().await;

        service.create_admin("admin", "password123").await.unwrap();
        assert!(service.create_admin("admin", "password456").await.is_err());
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let service = setup_service().await;
        service.create_admin("admin", "password123").await.unwrap();

        let verified = service
            .verify_credentials("admin", "password123")
            .await
            .unwrap();
        assert!(verified.is_some());
        assert_eq!(verified.unwrap().username, "admin");

        // Wrong password and unknown user are indistinguishable.
        assert!(
            service
                .verify_credentials("admin", "wrongpassword")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            service
                .verify_credentials("nobody", "password123")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_change_password() {
        let service = setup_service().await;
        let admin = service.create_admin("admin", "password123").await.unwrap();

        service
            .change_password(admin.id, "newpassword456")
            .await
            .unwrap();

        assert!(
            service
                .verify_credentials("admin", "password123")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            service
                .verify_credentials("admin", "newpassword456")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_change_password_validates_length() {
        let service = setup_service().await;
        let admin = service.create_admin("admin", "password123").await.unwrap();

        assert!(service.change_password(admin.id, "short").await.is_err());
    }
}
