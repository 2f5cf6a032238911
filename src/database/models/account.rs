use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::Role;

/// users joined with profile, role and admin status
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub pwd_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub is_blocked: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl AccountRow {
    /// Rows with an unrecognised role string are treated as having no role
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    /// The block flag only means something for admins
    pub fn is_blocked(&self) -> bool {
        self.role() == Some(Role::Admin) && self.is_blocked.unwrap_or(false)
    }
}

/// Public view of an account; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub role: Option<Role>,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        let role = row.role();
        let is_blocked = row.is_blocked();
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            role,
            is_blocked,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminStatus {
    pub admin_id: Uuid,
    pub is_blocked: bool,
    pub blocked_at: Option<DateTime<Utc>>,
    pub blocked_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}
