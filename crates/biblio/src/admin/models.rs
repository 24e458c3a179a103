//! Administrator account models.

use serde::Serialize;
use sqlx::FromRow;

/// Administrator account row.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    /// Account ID.
    pub id: i64,
    /// Login username.
    pub username: String,
    /// bcrypt password hash.
    pub password_hash: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
    /// Last successful login timestamp.
    pub last_login_at: Option<String>,
}

/// Administrator identity as exposed on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct AdminInfo {
    pub id: i64,
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl From<&Admin> for AdminInfo {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username.clone(),
            is_admin: true,
        }
    }
}
